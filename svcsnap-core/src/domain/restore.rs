//! Restore result domain model

use serde::Serialize;

use super::result::Error;
use super::service::StartupType;

/// Outcome of replaying a snapshot onto the live system
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreReport {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<RestoreEntry>,
}

impl RestoreReport {
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RestoreEntry> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Individual service restore entry
#[derive(Debug, Clone, Serialize)]
pub struct RestoreEntry {
    pub service: String,
    pub startup_type: StartupType,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RestoreEntry {
    /// The failure as a core error, if this entry failed
    pub fn as_apply_error(&self) -> Option<Error> {
        self.error.as_ref().map(|message| Error::Apply {
            name: self.service.clone(),
            message: message.clone(),
        })
    }
}
