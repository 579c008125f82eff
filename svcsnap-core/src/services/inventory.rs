//! Inventory service - live service enumeration

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::Snapshot;
use crate::ports::ServiceManager;

/// Inventory service for reading the current state of the system
#[derive(Clone)]
pub struct InventoryService {
    manager: Arc<dyn ServiceManager>,
}

impl InventoryService {
    pub fn new(manager: Arc<dyn ServiceManager>) -> Self {
        Self { manager }
    }

    /// Enumerate live services into a sorted snapshot (statuses retained)
    pub fn current(&self) -> Result<LiveInventory> {
        let result = self.manager.list_services()?;
        let snapshot = Snapshot::new(result.services)?;

        Ok(LiveInventory {
            snapshot,
            warnings: result.warnings,
        })
    }
}

/// Live services plus any non-fatal enumeration warnings
#[derive(Debug)]
pub struct LiveInventory {
    pub snapshot: Snapshot,
    pub warnings: Vec<String>,
}
