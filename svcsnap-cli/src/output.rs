//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use svcsnap_core::services::snapshot::to_pretty_json;
use serde::Serialize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print live enumeration warnings
pub fn warnings(items: &[String]) {
    for w in items {
        warning(w);
    }
}

/// Print a value as 4-space indented JSON with non-ASCII kept literal
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let bytes = to_pretty_json(value)?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}
