//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - PowerShell (`Get-Service` / `Set-Service`) for Windows
//! - systemctl for Linux

pub mod powershell;
pub mod systemd;

use std::sync::Arc;

use crate::config::{Backend, Config};
use crate::ports::ServiceManager;

/// Create the service manager selected by the configuration
pub fn create_service_manager(config: &Config) -> Arc<dyn ServiceManager> {
    match config.backend {
        Backend::PowerShell => Arc::new(powershell::PowerShellServiceManager::new(
            config.shell.clone(),
            config.codepage,
        )),
        Backend::Systemd => Arc::new(systemd::SystemdServiceManager::new(config.systemd_user)),
    }
}
