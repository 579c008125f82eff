//! Print command - show the live services with their current status

use anyhow::{Context, Result};

use super::{get_context, tracked};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    tracked("print", |_| {
        let ctx = get_context()?;
        let live = ctx
            .inventory_service
            .current()
            .context("Failed to enumerate services")?;

        if json {
            return output::json(live.snapshot.records());
        }

        output::warnings(&live.warnings);

        let mut table = output::create_table();
        table.set_header(vec!["Name", "Display Name", "Status", "Startup Type"]);
        for record in &live.snapshot {
            table.add_row(vec![
                record.name.clone(),
                record.display_name.clone(),
                record.status.map(|s| s.to_string()).unwrap_or_default(),
                record.startup_type.to_string(),
            ]);
        }
        println!("{}", table);
        println!("{} services ({})", live.snapshot.len(), ctx.manager.name());
        Ok(())
    })
}
