//! Restore command - apply saved startup types to the live system

use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use super::{ensure_file_exists, get_context, log_event, tracked};
use crate::output;
use svcsnap_core::LogEvent;

pub fn run(file: &Path, force: bool, json: bool) -> Result<()> {
    tracked("restore", |logger| {
        ensure_file_exists(file)?;
        let ctx = get_context()?;

        let snapshot = ctx
            .snapshot_service
            .load(file)
            .with_context(|| format!("Failed to load {}", file.display()))?;

        if !force && !json {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Apply startup types of {} services from {}?",
                    snapshot.len(),
                    file.display()
                ))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled.");
                return Ok(());
            }
        }

        let progress = if json {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(snapshot.len() as u64);
            pb.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        };

        let report = ctx.restore_service.restore_with_progress(&snapshot, |name| {
            progress.set_message(name.to_string());
            progress.inc(1);
        });
        progress.finish_and_clear();

        for failure in report.failures() {
            log_event(
                logger,
                LogEvent::new("restore_service_failed")
                    .with_command("restore")
                    .with_service(failure.service.as_str())
                    .with_error(failure.error.clone().unwrap_or_default()),
            );
        }

        if json {
            return output::json(&report);
        }

        for failure in report.failures() {
            if let Some(err) = failure.as_apply_error() {
                output::error(&err.to_string());
            }
        }

        if report.failed == 0 {
            output::success(&format!("Services restored ({})", report.succeeded));
        } else {
            output::warning(&format!(
                "Services restored: {} succeeded, {} failed",
                report.succeeded, report.failed
            ));
        }
        Ok(())
    })
}
