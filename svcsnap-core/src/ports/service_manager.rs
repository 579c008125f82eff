//! OS service manager port
//!
//! Defines the interface for enumerating services and changing their startup
//! type (PowerShell on Windows, systemctl on Linux, fakes in tests).

use crate::domain::result::Result;
use crate::domain::{ServiceRecord, StartupType};

/// Result of enumerating live services
#[derive(Debug, Default)]
pub struct EnumerationResult {
    pub services: Vec<ServiceRecord>,
    /// Non-fatal diagnostics (e.g. the command exited non-zero but its output parsed)
    pub warnings: Vec<String>,
}

/// Service manager trait
///
/// Implementations talk to the OS. The inventory, diff and restore services
/// use this trait without knowing which backend is behind it.
pub trait ServiceManager: Send + Sync {
    /// Backend name (e.g., "powershell", "systemd")
    fn name(&self) -> &str;

    /// Enumerate all services with name, display name, status and startup type
    ///
    /// Fails with `Error::Enumeration` when the OS query cannot run or its
    /// output cannot be parsed.
    fn list_services(&self) -> Result<EnumerationResult>;

    /// Set the startup type of one service
    ///
    /// Returns the OS-reported error text on failure.
    fn apply_startup_type(
        &self,
        name: &str,
        startup_type: StartupType,
    ) -> std::result::Result<(), String>;
}
