//! svcsnap core - snapshot, diff and restore of OS service startup types
//!
//! This crate implements the core logic following hexagonal architecture:
//!
//! - **domain**: Core entities (ServiceRecord, Snapshot, DiffReport, ...)
//! - **ports**: Trait definitions for external dependencies (ServiceManager)
//! - **services**: Snapshot store, diff engine, restore executor, logging
//! - **adapters**: Concrete implementations (PowerShell, systemd)

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use config::Config;
use ports::ServiceManager;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{
    DiffReport, FieldChange, FieldDiff, RestoreReport, ServiceDrift, ServiceField, ServiceRecord,
    ServiceStatus, Snapshot, SnapshotMetadata, StartupType,
};
pub use services::{LogEvent, LoggingService};

/// Main context for svcsnap operations
///
/// Holds the configuration, the service manager for this platform and all
/// services built on top of it.
pub struct SvcSnapContext {
    pub config: Config,
    pub manager: Arc<dyn ServiceManager>,
    pub snapshot_service: SnapshotService,
    pub inventory_service: InventoryService,
    pub diff_service: DiffService,
    pub restore_service: RestoreService,
}

impl SvcSnapContext {
    /// Create a context from the settings in `app_dir`
    pub fn new(app_dir: &Path) -> Result<Self> {
        let config = Config::load(app_dir)?;
        let manager = adapters::create_service_manager(&config);
        Ok(Self::with_manager(config, manager))
    }

    /// Create a context around an explicit service manager
    pub fn with_manager(config: Config, manager: Arc<dyn ServiceManager>) -> Self {
        let snapshot_service = SnapshotService::new(config.snapshot_dir.clone());
        let inventory_service = InventoryService::new(Arc::clone(&manager));
        let diff_service = DiffService::new(Arc::clone(&manager));
        let restore_service = RestoreService::new(Arc::clone(&manager));

        Self {
            config,
            manager,
            snapshot_service,
            inventory_service,
            diff_service,
            restore_service,
        }
    }
}
