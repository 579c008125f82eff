//! Save command - write the live startup configuration to a snapshot file

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use super::{get_context, tracked};
use crate::output;

pub fn run(output_path: Option<PathBuf>, json: bool) -> Result<()> {
    tracked("save", |_| {
        let ctx = get_context()?;
        let live = ctx
            .inventory_service
            .current()
            .context("Failed to enumerate services")?;

        let path = match output_path {
            Some(path) => {
                ctx.snapshot_service
                    .save(&live.snapshot, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                path
            }
            None => ctx
                .snapshot_service
                .save_timestamped(&live.snapshot)
                .context("Failed to write snapshot")?,
        };
        let path = std::path::absolute(&path).unwrap_or(path);

        if json {
            output::json(&json!({
                "path": path,
                "services": live.snapshot.len(),
                "warnings": live.warnings,
            }))?;
        } else {
            output::warnings(&live.warnings);
            output::success(&format!("Services saved to \"{}\"", path.display()));
        }
        Ok(())
    })
}
