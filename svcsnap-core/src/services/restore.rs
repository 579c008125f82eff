//! Restore service - replay saved startup types onto the live system

use std::sync::Arc;

use crate::domain::{RestoreEntry, RestoreReport, Snapshot, StartupType};
use crate::ports::ServiceManager;

/// Apply every record's startup type through `apply`, one service at a time
///
/// A failing service is recorded and the batch continues; the report lists
/// every attempt in snapshot order.
pub fn restore<F>(snapshot: &Snapshot, mut apply: F) -> RestoreReport
where
    F: FnMut(&str, StartupType) -> Result<(), String>,
{
    let mut report = RestoreReport::default();

    for record in snapshot {
        match apply(&record.name, record.startup_type) {
            Ok(()) => {
                report.succeeded += 1;
                report.results.push(RestoreEntry {
                    service: record.name.clone(),
                    startup_type: record.startup_type,
                    success: true,
                    error: None,
                });
            }
            Err(e) => {
                report.failed += 1;
                report.results.push(RestoreEntry {
                    service: record.name.clone(),
                    startup_type: record.startup_type,
                    success: false,
                    error: Some(e),
                });
            }
        }
    }

    report
}

/// Restore service bound to the OS service manager
pub struct RestoreService {
    manager: Arc<dyn ServiceManager>,
}

impl RestoreService {
    pub fn new(manager: Arc<dyn ServiceManager>) -> Self {
        Self { manager }
    }

    /// Restore all startup types from a snapshot
    pub fn restore(&self, snapshot: &Snapshot) -> RestoreReport {
        self.restore_with_progress(snapshot, |_| {})
    }

    /// Restore, calling `on_service` before each service is applied
    pub fn restore_with_progress<P>(&self, snapshot: &Snapshot, mut on_service: P) -> RestoreReport
    where
        P: FnMut(&str),
    {
        restore(snapshot, |name, startup_type| {
            on_service(name);
            self.manager.apply_startup_type(name, startup_type)
        })
    }
}
