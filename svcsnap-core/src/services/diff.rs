//! Diff service - snapshot reconciliation
//!
//! Two algorithms are provided:
//!
//! - [`diff_strict`] assumes both snapshots describe the same set of services
//!   and reports field-level changes only. Any difference in the service set
//!   is an error.
//! - [`diff_tolerant`] compares a backup against the live system, where
//!   services come and go. It reports startup-type drift, deleted services
//!   and new services.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{DiffReport, FieldChange, FieldDiff, ServiceDrift, ServiceRecord, Snapshot};
use crate::ports::ServiceManager;

use super::inventory::InventoryService;

/// Field-level diff of two snapshots of the same service set
///
/// Output follows the order of `new`; unchanged services are omitted.
pub fn diff_strict(old: &Snapshot, new: &Snapshot) -> Result<Vec<FieldDiff>> {
    if old.len() != new.len() {
        return Err(Error::CountMismatch {
            old: old.len(),
            new: new.len(),
        });
    }

    let old_by_name = old.index_by_name();
    let mut diffs = Vec::new();

    for current in new {
        let previous = old_by_name
            .get(current.name.as_str())
            .ok_or_else(|| Error::not_found(current.name.clone()))?;

        if current != *previous {
            diffs.push(FieldDiff {
                service: current.name.clone(),
                changes: FieldChange::between(previous, current),
            });
        }
    }

    Ok(diffs)
}

/// Drift report of a backup against the live system
///
/// With `ignore_suffix`, names are normalized on both sides before matching.
/// When several records collapse onto the same normalized name, the last one
/// in snapshot order wins.
pub fn diff_tolerant(backup: &Snapshot, live: &Snapshot, ignore_suffix: bool) -> DiffReport {
    let backup_by_name = keyed(backup, ignore_suffix);
    let live_by_name = keyed(live, ignore_suffix);

    let mut changed = Vec::new();
    for current in live_by_name.values() {
        let Some(previous) = backup_by_name.get(&current.name) else {
            continue;
        };
        if current == previous || current.startup_type == previous.startup_type {
            continue;
        }
        changed.push(ServiceDrift {
            current: current.clone(),
            changes: FieldChange::between(previous, current),
        });
    }

    let mut deleted: Vec<ServiceRecord> = backup_by_name
        .values()
        .filter(|r| !live_by_name.contains_key(&r.name))
        .cloned()
        .collect();

    let mut new: Vec<ServiceRecord> = live_by_name
        .values()
        .filter(|r| !backup_by_name.contains_key(&r.name))
        .cloned()
        .collect();

    changed.sort_by(|a, b| a.current.display_order(&b.current));
    deleted.sort_by(|a, b| a.display_order(b));
    new.sort_by(|a, b| a.display_order(b));

    DiffReport {
        changed,
        deleted,
        new,
    }
}

/// Derived `name -> record` map, last write wins
fn keyed(snapshot: &Snapshot, ignore_suffix: bool) -> HashMap<String, ServiceRecord> {
    let mut map = HashMap::with_capacity(snapshot.len());
    for record in snapshot {
        let record = if ignore_suffix {
            record.persisted().with_normalized_name()
        } else {
            record.persisted()
        };
        map.insert(record.name.clone(), record);
    }
    map
}

/// Diff service binding the reconciliation engine to the live system
pub struct DiffService {
    inventory: InventoryService,
}

impl DiffService {
    pub fn new(manager: Arc<dyn ServiceManager>) -> Self {
        Self {
            inventory: InventoryService::new(manager),
        }
    }

    /// Compare a backup snapshot with the services currently installed
    pub fn against_live(&self, backup: &Snapshot, ignore_suffix: bool) -> Result<LiveDiff> {
        let live = self.inventory.current()?;
        Ok(LiveDiff {
            report: diff_tolerant(backup, &live.snapshot, ignore_suffix),
            warnings: live.warnings,
        })
    }

    /// Compare two snapshots of the same service set
    pub fn between(&self, old: &Snapshot, new: &Snapshot) -> Result<Vec<FieldDiff>> {
        diff_strict(old, new)
    }
}

/// Result of diffing against the live system
#[derive(Debug, Serialize)]
pub struct LiveDiff {
    #[serde(flatten)]
    pub report: DiffReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
