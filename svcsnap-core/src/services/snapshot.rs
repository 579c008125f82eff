//! Snapshot service - snapshot file management
//!
//! Reads and writes the snapshot file format: a UTF-8 JSON array of
//! `{"Name", "DisplayName", "StartType"}` objects, 4-space indented, with
//! non-ASCII characters kept literal.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, TimeZone};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::domain::result::{Error, Result};
use crate::domain::{ServiceField, ServiceRecord, Snapshot, SnapshotMetadata, StartupType};

const FILE_PREFIX: &str = "services_";
const FILE_EXTENSION: &str = "json";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// Snapshot service for saving, loading and listing snapshot files
pub struct SnapshotService {
    snapshot_dir: PathBuf,
}

impl SnapshotService {
    pub fn new(snapshot_dir: PathBuf) -> Self {
        Self { snapshot_dir }
    }

    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// Write a snapshot to `dest`, persisting only name, display name and startup type
    pub fn save(&self, snapshot: &Snapshot, dest: &Path) -> Result<()> {
        let file = File::create(dest)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&render(snapshot)?)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a snapshot as `services_YYYYMMDD_HHMM.json` in the snapshot directory
    pub fn save_timestamped(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.snapshot_dir)?;

        let file_name = format!(
            "{}{}.{}",
            FILE_PREFIX,
            Local::now().format(TIMESTAMP_FORMAT),
            FILE_EXTENSION
        );
        let path = self.snapshot_dir.join(file_name);
        self.save(snapshot, &path)?;
        Ok(path)
    }

    /// Load and validate a snapshot file
    pub fn load(&self, src: &Path) -> Result<Snapshot> {
        let content = fs::read_to_string(src)?;
        parse(&content)
    }

    /// List saved snapshots in the snapshot directory, newest first
    pub fn list(&self) -> Result<Vec<SnapshotMetadata>> {
        if !self.snapshot_dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&self.snapshot_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }

            let Some(created_at) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_snapshot_time)
            else {
                continue;
            };

            let size_bytes = fs::metadata(&path)?.len();
            snapshots.push(SnapshotMetadata::new(path, created_at, size_bytes));
        }

        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.name.cmp(&a.name)));
        Ok(snapshots)
    }
}

/// Parse creation time from a `services_YYYYMMDD_HHMM.json` file name
fn parse_snapshot_time(file_name: &str) -> Option<chrono::DateTime<Local>> {
    let ts = file_name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_EXTENSION)?
        .strip_suffix('.')?;
    let naive = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Serialize a snapshot to the on-disk representation
pub fn render(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let persisted: Vec<ServiceRecord> = snapshot.iter().map(ServiceRecord::persisted).collect();
    to_pretty_json(&persisted)
}

/// Pretty-print JSON with the 4-space indentation used by snapshot files
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Parse and validate snapshot file content
///
/// The whole document is validated before a snapshot is returned; a single
/// bad record fails the load.
pub fn parse(content: &str) -> Result<Snapshot> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let value: Value = serde_json::from_str(content)
        .map_err(|e| Error::malformed(format!("File is not valid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(Error::malformed("File is not a list of services"));
    };

    let objects = items
        .iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            _ => Err(Error::malformed("File is not a list of services")),
        })
        .collect::<Result<Vec<_>>>()?;

    // Presence of every key is checked for all records before any value is interpreted
    for object in &objects {
        for field in ServiceField::ALL {
            if !object.contains_key(field.key()) {
                return Err(Error::MissingField {
                    key: field.key().to_string(),
                    record: pretty_record(object),
                });
            }
        }
    }

    let records = objects
        .into_iter()
        .map(parse_record)
        .collect::<Result<Vec<_>>>()?;

    Snapshot::new(records)
}

fn parse_record(object: &Map<String, Value>) -> Result<ServiceRecord> {
    let name = string_field(object, ServiceField::Name)?;
    let display_name = string_field(object, ServiceField::DisplayName)?;
    let startup_type = match &object[ServiceField::StartType.key()] {
        Value::String(s) => s.parse::<StartupType>()?,
        Value::Number(n) => n
            .as_i64()
            .and_then(StartupType::from_code)
            .ok_or_else(|| {
                Error::malformed(format!(
                    "Unknown startup type code {} in:\n{}",
                    n,
                    pretty_record(object)
                ))
            })?,
        _ => return Err(wrong_type(object, ServiceField::StartType)),
    };

    Ok(ServiceRecord::new(name, display_name, startup_type))
}

fn string_field(object: &Map<String, Value>, field: ServiceField) -> Result<String> {
    match &object[field.key()] {
        Value::String(s) => Ok(s.clone()),
        _ => Err(wrong_type(object, field)),
    }
}

fn wrong_type(object: &Map<String, Value>, field: ServiceField) -> Error {
    Error::malformed(format!(
        "Key \"{}\" has an unexpected type in:\n{}",
        field.key(),
        pretty_record(object)
    ))
}

fn pretty_record(object: &Map<String, Value>) -> String {
    to_pretty_json(object)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_else(|_| format!("{:?}", object))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sorts_by_display_name() {
        let content = r#"[
            {"Name": "wuauserv", "DisplayName": "Windows Update", "StartType": "Manual"},
            {"Name": "Spooler", "DisplayName": "Print Spooler", "StartType": "Automatic"}
        ]"#;
        let snapshot = parse(content).unwrap();
        assert_eq!(snapshot.records()[0].name, "Spooler");
        assert_eq!(snapshot.records()[1].name, "wuauserv");
    }

    #[test]
    fn test_parse_rejects_non_list() {
        let result = parse(r#"{"Name": "Spooler"}"#);
        assert!(matches!(result, Err(Error::MalformedSnapshot(_))));

        let result = parse(r#"[1, 2, 3]"#);
        assert!(matches!(result, Err(Error::MalformedSnapshot(_))));
    }

    #[test]
    fn test_parse_missing_field() {
        let content = r#"[
            {"Name": "a", "DisplayName": "A", "StartType": "Manual"},
            {"Name": "b", "DisplayName": "B"}
        ]"#;
        match parse(content) {
            Err(Error::MissingField { key, record }) => {
                assert_eq!(key, "StartType");
                assert!(record.contains("\"Name\": \"b\""));
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_accepts_numeric_start_mode_and_extra_keys() {
        let content = r#"[{"Name": "a", "DisplayName": "A", "Status": 4, "StartType": 2}]"#;
        let snapshot = parse(content).unwrap();
        assert_eq!(snapshot.records()[0].startup_type, StartupType::Automatic);
        assert!(snapshot.records()[0].status.is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_value_type() {
        let content = r#"[{"Name": 5, "DisplayName": "A", "StartType": "Manual"}]"#;
        assert!(matches!(parse(content), Err(Error::MalformedSnapshot(_))));
    }

    #[test]
    fn test_parse_tolerates_bom() {
        let content = "\u{feff}[{\"Name\": \"a\", \"DisplayName\": \"A\", \"StartType\": \"Manual\"}]";
        assert_eq!(parse(content).unwrap().len(), 1);
    }

    #[test]
    fn test_render_format() {
        let snapshot = Snapshot::new(vec![ServiceRecord::new(
            "Spooler",
            "Диспетчер печати",
            StartupType::Automatic,
        )])
        .unwrap();
        let text = String::from_utf8(render(&snapshot).unwrap()).unwrap();
        assert_eq!(
            text,
            "[\n    {\n        \"Name\": \"Spooler\",\n        \"DisplayName\": \"Диспетчер печати\",\n        \"StartType\": \"Automatic\"\n    }\n]"
        );
    }

    #[test]
    fn test_parse_snapshot_time() {
        assert!(parse_snapshot_time("services_20250115_1030.json").is_some());
        assert!(parse_snapshot_time("services_latest.json").is_none());
        assert!(parse_snapshot_time("notes.json").is_none());
    }
}
