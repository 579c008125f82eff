//! Core domain entities
//!
//! All entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod diff;
pub mod naming;
mod restore;
mod service;
mod snapshot_file;
pub mod result;

pub use diff::{DiffReport, FieldChange, FieldDiff, ServiceDrift};
pub use restore::{RestoreEntry, RestoreReport};
pub use service::{ServiceField, ServiceRecord, ServiceStatus, Snapshot, StartupType};
pub use snapshot_file::SnapshotMetadata;
