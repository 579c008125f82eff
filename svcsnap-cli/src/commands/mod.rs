//! CLI command implementations

pub mod compare;
pub mod config;
pub mod diff;
pub mod list;
pub mod logs;
pub mod print;
pub mod restore;
pub mod save;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use svcsnap_core::{LogEvent, LoggingService, OperationResult, SvcSnapContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir().ok()?;
    std::fs::create_dir_all(&app_dir).ok()?;
    LoggingService::new(&app_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the app directory from environment or default
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SVCSNAP_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".svcsnap"))
}

/// Build the svcsnap context for this machine
pub fn get_context() -> Result<SvcSnapContext> {
    let app_dir = get_app_dir()?;

    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;

    SvcSnapContext::new(&app_dir).context("Failed to initialize svcsnap context")
}

/// Fail with the usual message when a snapshot file is missing
pub fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("File \"{}\" does not exist", path.display());
    }
    Ok(())
}

/// Run a command body, bracketing it with started/completed/failed events
pub fn tracked<T>(command: &str, body: impl FnOnce(&Option<LoggingService>) -> Result<T>) -> Result<T> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new(format!("{}_started", command)).with_command(command));

    match body(&logger) {
        Ok(value) => {
            log_event(&logger, LogEvent::new(format!("{}_completed", command)).with_command(command));
            Ok(value)
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new(format!("{}_failed", command))
                    .with_command(command)
                    .with_error(e.to_string())
                    .with_error_details(format!("{:?}", e)),
            );
            Err(e)
        }
    }
}

/// Print a JSON failure envelope for `--json` callers
pub fn print_json_failure(command: &str, error: &anyhow::Error) -> Result<()> {
    let mut context = HashMap::new();
    context.insert("command".to_string(), serde_json::json!(command));
    let chain: Vec<String> = error.chain().skip(1).map(|c| c.to_string()).collect();
    if !chain.is_empty() {
        context.insert("causes".to_string(), serde_json::json!(chain));
    }

    let result: OperationResult<()> = OperationResult::fail_with_context(error.to_string(), context);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
