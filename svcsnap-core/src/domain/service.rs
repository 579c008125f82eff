//! Service record domain model

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::naming;
use super::result::{Error, Result};

/// Startup policy of a service, as reported by the OS service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartupType {
    Boot,
    System,
    Automatic,
    AutomaticDelayedStart,
    Manual,
    Disabled,
    Unknown,
}

impl StartupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartupType::Boot => "Boot",
            StartupType::System => "System",
            StartupType::Automatic => "Automatic",
            StartupType::AutomaticDelayedStart => "AutomaticDelayedStart",
            StartupType::Manual => "Manual",
            StartupType::Disabled => "Disabled",
            StartupType::Unknown => "Unknown",
        }
    }

    /// Map a numeric `ServiceStartMode` code (ConvertTo-Json without `-EnumsAsStrings`)
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(StartupType::Boot),
            1 => Some(StartupType::System),
            2 => Some(StartupType::Automatic),
            3 => Some(StartupType::Manual),
            4 => Some(StartupType::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for StartupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartupType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boot" => Ok(StartupType::Boot),
            "system" => Ok(StartupType::System),
            "automatic" | "auto" => Ok(StartupType::Automatic),
            "automaticdelayedstart" => Ok(StartupType::AutomaticDelayedStart),
            "manual" => Ok(StartupType::Manual),
            "disabled" => Ok(StartupType::Disabled),
            // PowerShell 7 reports services it cannot classify as InvalidValue
            "unknown" | "invalidvalue" => Ok(StartupType::Unknown),
            _ => Err(Error::malformed(format!("Unknown startup type \"{}\"", s.trim()))),
        }
    }
}

/// Runtime state of a service. Only present in the live view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Running,
    Stopped,
    Paused,
    StartPending,
    StopPending,
    ContinuePending,
    PausePending,
    Unknown,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Running => "Running",
            ServiceStatus::Stopped => "Stopped",
            ServiceStatus::Paused => "Paused",
            ServiceStatus::StartPending => "StartPending",
            ServiceStatus::StopPending => "StopPending",
            ServiceStatus::ContinuePending => "ContinuePending",
            ServiceStatus::PausePending => "PausePending",
            ServiceStatus::Unknown => "Unknown",
        }
    }

    /// Lenient parse: anything unrecognised is `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => ServiceStatus::Running,
            "stopped" => ServiceStatus::Stopped,
            "paused" => ServiceStatus::Paused,
            "startpending" => ServiceStatus::StartPending,
            "stoppending" => ServiceStatus::StopPending,
            "continuepending" => ServiceStatus::ContinuePending,
            "pausepending" => ServiceStatus::PausePending,
            _ => ServiceStatus::Unknown,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted (and compared) fields of a service record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceField {
    Name,
    DisplayName,
    StartType,
}

impl ServiceField {
    /// All persisted fields, in file order
    pub const ALL: [ServiceField; 3] = [
        ServiceField::Name,
        ServiceField::DisplayName,
        ServiceField::StartType,
    ];

    /// Key used in the snapshot file
    pub fn key(&self) -> &'static str {
        match self {
            ServiceField::Name => "Name",
            ServiceField::DisplayName => "DisplayName",
            ServiceField::StartType => "StartType",
        }
    }
}

impl fmt::Display for ServiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Startup configuration of one OS service
///
/// Equality only considers the persisted fields (`name`, `display_name`,
/// `startup_type`); `status` is transient and never compared.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,
    #[serde(rename = "StartType")]
    pub startup_type: StartupType,
}

impl ServiceRecord {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        startup_type: StartupType,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            status: None,
            startup_type,
        }
    }

    pub fn with_status(mut self, status: ServiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// String value of a persisted field
    pub fn field_value(&self, field: ServiceField) -> String {
        match field {
            ServiceField::Name => self.name.clone(),
            ServiceField::DisplayName => self.display_name.clone(),
            ServiceField::StartType => self.startup_type.to_string(),
        }
    }

    /// Persisted fields whose values differ between `self` and `other`
    pub fn changed_fields(&self, other: &ServiceRecord) -> Vec<ServiceField> {
        ServiceField::ALL
            .iter()
            .copied()
            .filter(|field| match field {
                ServiceField::Name => self.name != other.name,
                ServiceField::DisplayName => self.display_name != other.display_name,
                ServiceField::StartType => self.startup_type != other.startup_type,
            })
            .collect()
    }

    /// Derive a copy whose name has its instance suffix stripped
    pub fn with_normalized_name(&self) -> ServiceRecord {
        ServiceRecord {
            name: naming::normalize(&self.name),
            ..self.clone()
        }
    }

    /// Copy without the transient runtime status
    pub fn persisted(&self) -> ServiceRecord {
        ServiceRecord {
            status: None,
            ..self.clone()
        }
    }

    /// Snapshot ordering: display name (ordinal), then name
    pub fn display_order(&self, other: &ServiceRecord) -> Ordering {
        self.display_name
            .cmp(&other.display_name)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialEq for ServiceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.display_name == other.display_name
            && self.startup_type == other.startup_type
    }
}

impl Eq for ServiceRecord {}

/// A point-in-time list of service records, sorted by display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<ServiceRecord>,
}

impl Snapshot {
    /// Build a snapshot, enforcing unique names and display-name order
    pub fn new(mut records: Vec<ServiceRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.name.as_str()) {
                return Err(Error::DuplicateService(record.name.clone()));
            }
        }
        records.sort_by(|a, b| a.display_order(b));
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Derived `name -> record` lookup
    pub fn index_by_name(&self) -> HashMap<&str, &ServiceRecord> {
        self.records.iter().map(|r| (r.name.as_str(), r)).collect()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a ServiceRecord;
    type IntoIter = std::slice::Iter<'a, ServiceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
