//! Diff result domain model

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::service::{ServiceField, ServiceRecord};

/// Before/after values of one persisted field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: ServiceField,
    pub old_value: String,
    pub new_value: String,
}

impl FieldChange {
    /// Collect the changes between two versions of the same service
    pub fn between(old: &ServiceRecord, new: &ServiceRecord) -> Vec<FieldChange> {
        old.changed_fields(new)
            .into_iter()
            .map(|field| FieldChange {
                field,
                old_value: old.field_value(field),
                new_value: new.field_value(field),
            })
            .collect()
    }

    /// `"old -> new"` rendering used in drift reports
    pub fn overlay(&self) -> String {
        format!("{} -> {}", self.old_value, self.new_value)
    }
}

#[derive(Serialize)]
struct ValueChange<'a> {
    #[serde(rename = "OldValue")]
    old_value: &'a str,
    #[serde(rename = "NewValue")]
    new_value: &'a str,
}

/// Field-level difference of one service (strict comparison)
///
/// Serializes as `{"Service": name, "<Field>": {"OldValue": .., "NewValue": ..}, ..}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    /// Name of the service in the newer snapshot
    pub service: String,
    pub changes: Vec<FieldChange>,
}

impl FieldDiff {
    pub fn change(&self, field: ServiceField) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }
}

impl Serialize for FieldDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.changes.len() + 1))?;
        map.serialize_entry("Service", &self.service)?;
        for change in &self.changes {
            map.serialize_entry(
                change.field.key(),
                &ValueChange {
                    old_value: &change.old_value,
                    new_value: &change.new_value,
                },
            )?;
        }
        map.end()
    }
}

/// A live service whose startup type drifted from the backup
///
/// Serializes as the live record with every differing field replaced by
/// `"old -> new"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDrift {
    pub current: ServiceRecord,
    pub changes: Vec<FieldChange>,
}

impl ServiceDrift {
    /// Rendered value of a field: the overlay when it changed, the live value otherwise
    pub fn rendered(&self, field: ServiceField) -> String {
        self.changes
            .iter()
            .find(|c| c.field == field)
            .map(FieldChange::overlay)
            .unwrap_or_else(|| self.current.field_value(field))
    }
}

impl Serialize for ServiceDrift {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ServiceField::ALL.len()))?;
        for field in ServiceField::ALL {
            map.serialize_entry(field.key(), &self.rendered(field))?;
        }
        map.end()
    }
}

/// Classified difference between a backup and the live system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub changed: Vec<ServiceDrift>,
    pub deleted: Vec<ServiceRecord>,
    pub new: Vec<ServiceRecord>,
}

impl DiffReport {
    /// True when no drift was detected
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty() && self.new.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StartupType;

    #[test]
    fn test_drift_serializes_with_overlay() {
        let backup = ServiceRecord::new("A", "disp A", StartupType::Automatic);
        let live = ServiceRecord::new("A", "disp A", StartupType::Disabled);
        let drift = ServiceDrift {
            changes: FieldChange::between(&backup, &live),
            current: live,
        };

        let json = serde_json::to_value(&drift).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Name": "A",
                "DisplayName": "disp A",
                "StartType": "Automatic -> Disabled"
            })
        );
    }

    #[test]
    fn test_field_diff_serializes_old_and_new() {
        let old = ServiceRecord::new("Spooler", "Print Spooler", StartupType::Manual);
        let new = ServiceRecord::new("Spooler", "Print Spooler", StartupType::Automatic);
        let diff = FieldDiff {
            service: new.name.clone(),
            changes: FieldChange::between(&old, &new),
        };

        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["Service"], "Spooler");
        assert_eq!(json["StartType"]["OldValue"], "Manual");
        assert_eq!(json["StartType"]["NewValue"], "Automatic");
        assert!(json.get("DisplayName").is_none());
    }

    #[test]
    fn test_empty_report() {
        assert!(DiffReport::default().is_empty());
    }
}
