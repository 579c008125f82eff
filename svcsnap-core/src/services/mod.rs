//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case.

pub mod diff;
mod inventory;
pub mod logging;
pub mod restore;
pub mod snapshot;

pub use diff::{diff_strict, diff_tolerant, DiffService, LiveDiff};
pub use inventory::{InventoryService, LiveInventory};
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use restore::{restore, RestoreService};
pub use snapshot::SnapshotService;
