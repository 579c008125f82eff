//! Saved snapshot file metadata

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Metadata for a snapshot file on disk
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMetadata {
    /// File name (e.g., "services_20250115_1030.json")
    pub name: String,
    pub path: PathBuf,
    /// When the snapshot was taken
    pub created_at: DateTime<Local>,
    /// File size in bytes
    pub size_bytes: u64,
}

impl SnapshotMetadata {
    pub fn new(path: PathBuf, created_at: DateTime<Local>, size_bytes: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            created_at,
            size_bytes,
        }
    }

    /// Format size for human display
    pub fn size_display(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;

        if self.size_bytes >= MB {
            format!("{:.1} MB", self.size_bytes as f64 / MB as f64)
        } else if self.size_bytes >= KB {
            format!("{:.1} KB", self.size_bytes as f64 / KB as f64)
        } else {
            format!("{} bytes", self.size_bytes)
        }
    }
}
