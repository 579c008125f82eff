//! Diff command - compare a saved snapshot against the live system

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::{ensure_file_exists, get_context, tracked};
use crate::output;

pub fn run(file: &Path, ignore_suffix: bool, json: bool) -> Result<()> {
    tracked("diff", |_| {
        ensure_file_exists(file)?;
        let ctx = get_context()?;

        let backup = ctx
            .snapshot_service
            .load(file)
            .with_context(|| format!("Failed to load {}", file.display()))?;
        let diff = ctx
            .diff_service
            .against_live(&backup, ignore_suffix)
            .context("Failed to enumerate services")?;

        if json {
            return output::json(&diff);
        }

        output::warnings(&diff.warnings);

        let report = &diff.report;
        if report.is_empty() {
            output::success("No drift from the snapshot");
            return Ok(());
        }

        if !report.changed.is_empty() {
            output::json(&report.changed)?;
        }
        if !report.deleted.is_empty() {
            println!("{}", "Deleted services:".red().bold());
            output::json(&report.deleted)?;
        }
        if !report.new.is_empty() {
            println!("{}", "New services:".green().bold());
            output::json(&report.new)?;
        }
        Ok(())
    })
}
