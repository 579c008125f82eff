//! Compare command - field-level diff between two snapshot files

use std::path::Path;

use anyhow::{Context, Result};

use super::{ensure_file_exists, get_context, tracked};
use crate::output;

pub fn run(old: &Path, new: &Path, json: bool) -> Result<()> {
    tracked("compare", |_| {
        ensure_file_exists(old)?;
        ensure_file_exists(new)?;
        let ctx = get_context()?;

        let old_snapshot = ctx
            .snapshot_service
            .load(old)
            .with_context(|| format!("Failed to load {}", old.display()))?;
        let new_snapshot = ctx
            .snapshot_service
            .load(new)
            .with_context(|| format!("Failed to load {}", new.display()))?;

        let diffs = ctx.diff_service.between(&old_snapshot, &new_snapshot)?;

        if json {
            return output::json(&diffs);
        }

        if diffs.is_empty() {
            output::success("Snapshots are identical");
            return Ok(());
        }

        let mut table = output::create_table();
        table.set_header(vec!["Service", "Field", "Old", "New"]);
        for diff in &diffs {
            for change in &diff.changes {
                table.add_row(vec![
                    diff.service.clone(),
                    change.field.to_string(),
                    change.old_value.clone(),
                    change.new_value.clone(),
                ]);
            }
        }
        println!("{}", table);
        output::info(&format!("{} services differ", diffs.len()));
        Ok(())
    })
}
