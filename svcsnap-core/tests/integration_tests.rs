//! Integration tests for svcsnap-core services
//!
//! The OS service manager is faked at the trait level; snapshot files are
//! written to real temporary directories.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use svcsnap_core::config::Config;
use svcsnap_core::ports::{EnumerationResult, ServiceManager};
use svcsnap_core::services::{diff_strict, diff_tolerant, SnapshotService};
use svcsnap_core::{
    Error, ServiceField, ServiceRecord, ServiceStatus, Snapshot, StartupType, SvcSnapContext,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// In-memory service manager that records apply calls
struct FakeServiceManager {
    services: Mutex<Vec<ServiceRecord>>,
    failing: Vec<String>,
    applied: Mutex<Vec<(String, StartupType)>>,
}

impl FakeServiceManager {
    fn new(services: Vec<ServiceRecord>) -> Self {
        Self {
            services: Mutex::new(services),
            failing: Vec::new(),
            applied: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }
}

impl ServiceManager for FakeServiceManager {
    fn name(&self) -> &str {
        "fake"
    }

    fn list_services(&self) -> svcsnap_core::Result<EnumerationResult> {
        Ok(EnumerationResult {
            services: self.services.lock().unwrap().clone(),
            warnings: Vec::new(),
        })
    }

    fn apply_startup_type(&self, name: &str, startup_type: StartupType) -> Result<(), String> {
        self.applied
            .lock()
            .unwrap()
            .push((name.to_string(), startup_type));

        if self.failing.iter().any(|f| f == name) {
            return Err(format!("Service '{}' cannot be configured: Access is denied", name));
        }

        let mut services = self.services.lock().unwrap();
        if let Some(service) = services.iter_mut().find(|s| s.name == name) {
            service.startup_type = startup_type;
        }
        Ok(())
    }
}

fn record(name: &str, display: &str, startup_type: StartupType) -> ServiceRecord {
    ServiceRecord::new(name, display, startup_type)
}

fn create_context(temp_dir: &TempDir, manager: Arc<FakeServiceManager>) -> SvcSnapContext {
    let mut config = Config::default();
    config.snapshot_dir = temp_dir.path().to_path_buf();
    SvcSnapContext::with_manager(config, manager)
}

fn sample_services() -> Vec<ServiceRecord> {
    vec![
        record("wuauserv", "Windows Update", StartupType::Manual).with_status(ServiceStatus::Stopped),
        record("Spooler", "Print Spooler", StartupType::Automatic).with_status(ServiceStatus::Running),
        record("DiagTrack", "Connected User Experiences and Telemetry", StartupType::Automatic)
            .with_status(ServiceStatus::Running),
        record("Audiosrv", "Windows Audio", StartupType::AutomaticDelayedStart)
            .with_status(ServiceStatus::Running),
    ]
}

// ============================================================================
// Snapshot Store Tests
// ============================================================================

#[test]
fn test_save_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotService::new(temp_dir.path().to_path_buf());

    let snapshot = Snapshot::new(vec![
        record("b", "Беспроводная сеть", StartupType::Disabled),
        record("a", "Alpha", StartupType::Automatic),
        record("c", "Gamma", StartupType::AutomaticDelayedStart),
    ])
    .unwrap();

    let path = temp_dir.path().join("snapshot.json");
    store.save(&snapshot, &path).unwrap();
    let loaded = store.load(&path).unwrap();

    assert_eq!(loaded, snapshot);

    // Non-ASCII is written literally, not escaped
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("Беспроводная сеть"));
    assert!(!text.contains("\\u"));
}

#[test]
fn test_save_drops_status() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotService::new(temp_dir.path().to_path_buf());
    let snapshot = Snapshot::new(sample_services()).unwrap();

    let path = temp_dir.path().join("snapshot.json");
    store.save(&snapshot, &path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for item in json.as_array().unwrap() {
        let keys: Vec<&String> = item.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(item.get("Status").is_none());
    }
}

#[test]
fn test_load_is_sorted_by_display_name() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("unsorted.json");
    std::fs::write(
        &path,
        r#"[
            {"Name": "z", "DisplayName": "Zulu", "StartType": "Manual"},
            {"Name": "a", "DisplayName": "Alpha", "StartType": "Manual"},
            {"Name": "m", "DisplayName": "Mike", "StartType": "Manual"}
        ]"#,
    )
    .unwrap();

    let store = SnapshotService::new(temp_dir.path().to_path_buf());
    let loaded = store.load(&path).unwrap();
    let names: Vec<&str> = loaded.iter().map(|r| r.display_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Mike", "Zulu"]);
}

#[test]
fn test_load_missing_field_fails_whole_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"[
            {"Name": "a", "DisplayName": "Alpha", "StartType": "Manual"},
            {"Name": "b", "DisplayName": "Bravo"}
        ]"#,
    )
    .unwrap();

    let store = SnapshotService::new(temp_dir.path().to_path_buf());
    match store.load(&path) {
        Err(Error::MissingField { key, record }) => {
            assert_eq!(key, "StartType");
            assert!(record.contains("Bravo"));
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_load_duplicate_names_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dupes.json");
    std::fs::write(
        &path,
        r#"[
            {"Name": "a", "DisplayName": "Alpha", "StartType": "Manual"},
            {"Name": "a", "DisplayName": "Alpha 2", "StartType": "Manual"}
        ]"#,
    )
    .unwrap();

    let store = SnapshotService::new(temp_dir.path().to_path_buf());
    assert!(matches!(store.load(&path), Err(Error::DuplicateService(name)) if name == "a"));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotService::new(temp_dir.path().to_path_buf());
    assert!(matches!(
        store.load(&temp_dir.path().join("nope.json")),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_save_to_unwritable_destination_fails() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotService::new(temp_dir.path().to_path_buf());
    let snapshot = Snapshot::new(sample_services()).unwrap();

    let dest = temp_dir.path().join("missing-dir").join("snapshot.json");
    assert!(matches!(store.save(&snapshot, &dest), Err(Error::Io(_))));
}

#[test]
fn test_save_timestamped_and_list() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotService::new(temp_dir.path().join("snapshots"));
    let snapshot = Snapshot::new(sample_services()).unwrap();

    let path = store.save_timestamped(&snapshot).unwrap();
    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("services_"));
    assert!(file_name.ends_with(".json"));

    // Files that don't follow the naming scheme are ignored
    std::fs::write(temp_dir.path().join("snapshots").join("notes.json"), "[]").unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, file_name);
    assert!(listed[0].size_bytes > 0);
}

// ============================================================================
// Diff Engine Tests
// ============================================================================

#[test]
fn test_strict_diff_count_guard() {
    let old = Snapshot::new(sample_services()).unwrap();
    let mut fewer = sample_services();
    fewer.pop();
    let new = Snapshot::new(fewer).unwrap();

    assert!(matches!(
        diff_strict(&old, &new),
        Err(Error::CountMismatch { old: 4, new: 3 })
    ));
}

#[test]
fn test_strict_diff_between_saved_files() {
    let temp_dir = TempDir::new().unwrap();
    let store = SnapshotService::new(temp_dir.path().to_path_buf());

    let old = Snapshot::new(sample_services()).unwrap();
    let mut changed = sample_services();
    changed[1].startup_type = StartupType::Disabled;
    let new = Snapshot::new(changed).unwrap();

    let old_path = temp_dir.path().join("old.json");
    let new_path = temp_dir.path().join("new.json");
    store.save(&old, &old_path).unwrap();
    store.save(&new, &new_path).unwrap();

    let diffs = diff_strict(&store.load(&old_path).unwrap(), &store.load(&new_path).unwrap()).unwrap();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].service, "Spooler");
    let change = diffs[0].change(ServiceField::StartType).unwrap();
    assert_eq!(change.old_value, "Automatic");
    assert_eq!(change.new_value, "Disabled");
}

#[test]
fn test_tolerant_diff_example() {
    let backup = Snapshot::new(vec![record("A", "disp A", StartupType::Automatic)]).unwrap();
    let live = Snapshot::new(vec![
        record("A", "disp A", StartupType::Disabled),
        record("B", "disp B", StartupType::Manual),
    ])
    .unwrap();

    let report = diff_tolerant(&backup, &live, false);

    assert_eq!(report.changed.len(), 1);
    assert_eq!(
        serde_json::to_value(&report.changed[0]).unwrap(),
        serde_json::json!({
            "Name": "A",
            "DisplayName": "disp A",
            "StartType": "Automatic -> Disabled"
        })
    );
    assert_eq!(report.new, vec![record("B", "disp B", StartupType::Manual)]);
    assert!(report.deleted.is_empty());
}

#[test]
fn test_diff_against_live_after_drift() {
    let temp_dir = TempDir::new().unwrap();
    let manager = Arc::new(FakeServiceManager::new(sample_services()));
    let ctx = create_context(&temp_dir, Arc::clone(&manager));

    let live = ctx.inventory_service.current().unwrap();
    let path = ctx.snapshot_service.save_timestamped(&live.snapshot).unwrap();
    let backup = ctx.snapshot_service.load(&path).unwrap();

    // No drift right after saving
    let diff = ctx.diff_service.against_live(&backup, false).unwrap();
    assert!(diff.report.is_empty());

    // Something disables telemetry and a new service is installed
    manager
        .apply_startup_type("DiagTrack", StartupType::Disabled)
        .unwrap();
    manager
        .services
        .lock()
        .unwrap()
        .push(record("NewSvc", "A New Service", StartupType::Manual));

    let diff = ctx.diff_service.against_live(&backup, false).unwrap();
    assert_eq!(diff.report.changed.len(), 1);
    assert_eq!(diff.report.changed[0].current.name, "DiagTrack");
    assert_eq!(diff.report.new.len(), 1);
    assert_eq!(diff.report.new[0].name, "NewSvc");
    assert!(diff.report.deleted.is_empty());
}

// ============================================================================
// Restore Executor Tests
// ============================================================================

#[test]
fn test_restore_partial_failure_attempts_everything() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = Snapshot::new(vec![
        record("a", "1 first", StartupType::Automatic),
        record("b", "2 second", StartupType::Disabled),
        record("c", "3 third", StartupType::Manual),
    ])
    .unwrap();

    let manager = Arc::new(FakeServiceManager::new(Vec::new()).failing_on("b"));
    let ctx = create_context(&temp_dir, Arc::clone(&manager));

    let report = ctx.restore_service.restore(&snapshot);

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures[0].service, "b");
    assert!(failures[0].error.as_deref().unwrap().contains("Access is denied"));

    let applied: Vec<String> = manager
        .applied
        .lock()
        .unwrap()
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    assert_eq!(applied, vec!["a", "b", "c"]);
}

#[test]
fn test_restore_reverts_drift() {
    let temp_dir = TempDir::new().unwrap();
    let manager = Arc::new(FakeServiceManager::new(sample_services()));
    let ctx = create_context(&temp_dir, Arc::clone(&manager));

    let backup = ctx.inventory_service.current().unwrap().snapshot;
    manager
        .apply_startup_type("Spooler", StartupType::Disabled)
        .unwrap();
    assert!(!ctx.diff_service.against_live(&backup, false).unwrap().report.is_empty());

    let mut progressed = Vec::new();
    let report = ctx
        .restore_service
        .restore_with_progress(&backup, |name| progressed.push(name.to_string()));
    assert_eq!(report.failed, 0);
    assert_eq!(progressed.len(), backup.len());

    assert!(ctx.diff_service.against_live(&backup, false).unwrap().report.is_empty());
}
