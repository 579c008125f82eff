//! List command - show saved snapshots in the snapshot directory

use anyhow::{Context, Result};

use super::{get_context, tracked};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    tracked("list", |_| {
        let ctx = get_context()?;
        let snapshots = ctx
            .snapshot_service
            .list()
            .context("Failed to list snapshots")?;

        if json {
            return output::json(&snapshots);
        }

        if snapshots.is_empty() {
            println!(
                "No snapshots found in {}",
                ctx.snapshot_service.snapshot_dir().display()
            );
            return Ok(());
        }

        let mut table = output::create_table();
        table.set_header(vec!["Name", "Created", "Size"]);
        for snapshot in &snapshots {
            table.add_row(vec![
                snapshot.name.clone(),
                snapshot.created_at.format("%Y-%m-%d %H:%M").to_string(),
                snapshot.size_display(),
            ]);
        }
        println!("{}", table);
        Ok(())
    })
}
