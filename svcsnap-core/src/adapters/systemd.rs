//! systemd service manager adapter (Linux)
//!
//! Startup types come from `systemctl list-unit-files`; descriptions and
//! runtime state come from `systemctl list-units`. Startup type mapping:
//!
//! | unit file state            | startup type |
//! |----------------------------|--------------|
//! | enabled, enabled-runtime   | Automatic    |
//! | disabled                   | Manual       |
//! | masked, masked-runtime     | Disabled     |
//! | anything else (static, ..) | Unknown      |

use std::collections::HashMap;
use std::process::Command;

use crate::domain::result::{Error, Result};
use crate::domain::{ServiceRecord, ServiceStatus, StartupType};
use crate::ports::{EnumerationResult, ServiceManager};

/// Service manager backed by `systemctl`
pub struct SystemdServiceManager {
    user: bool,
}

impl SystemdServiceManager {
    /// `user` targets the per-user instance (`systemctl --user`)
    pub fn new(user: bool) -> Self {
        Self { user }
    }

    fn systemctl(&self) -> Command {
        let mut cmd = Command::new("systemctl");
        if self.user {
            cmd.arg("--user");
        }
        cmd.args(["--no-pager", "--no-legend"]);
        cmd
    }

    fn run_checked(&self, args: &[&str]) -> std::result::Result<String, String> {
        let output = self
            .systemctl()
            .args(args)
            .output()
            .map_err(|e| format!("Failed to execute systemctl: {}", e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                Err(format!("systemctl {} exited with {}", args.join(" "), output.status))
            } else {
                Err(stderr)
            }
        }
    }
}

impl ServiceManager for SystemdServiceManager {
    fn name(&self) -> &str {
        "systemd"
    }

    fn list_services(&self) -> Result<EnumerationResult> {
        let unit_files = self
            .run_checked(&["list-unit-files", "--type=service"])
            .map_err(Error::enumeration)?;

        let mut warnings = Vec::new();
        let units = match self.run_checked(&["list-units", "--type=service", "--all", "--plain"]) {
            Ok(stdout) => parse_units(&stdout),
            Err(e) => {
                warnings.push(format!("Failed to read unit descriptions: {}", e));
                HashMap::new()
            }
        };

        Ok(EnumerationResult {
            services: build_records(&parse_unit_files(&unit_files), &units),
            warnings,
        })
    }

    fn apply_startup_type(
        &self,
        name: &str,
        startup_type: StartupType,
    ) -> std::result::Result<(), String> {
        match startup_type {
            StartupType::Automatic => {
                self.run_checked(&["unmask", name])?;
                self.run_checked(&["enable", name])?;
            }
            StartupType::Manual => {
                self.run_checked(&["unmask", name])?;
                self.run_checked(&["disable", name])?;
            }
            StartupType::Disabled => {
                self.run_checked(&["mask", name])?;
            }
            other => return Err(format!("Startup type {} is not supported by systemd", other)),
        }
        Ok(())
    }
}

/// Runtime view of a loaded unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInfo {
    pub active_state: String,
    pub description: String,
}

/// Parse `list-unit-files` output into `(unit, state)` pairs
pub fn parse_unit_files(stdout: &str) -> Vec<(String, String)> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let unit = parts.next()?;
            let state = parts.next()?;
            Some((unit.to_string(), state.to_string()))
        })
        .collect()
}

/// Parse `list-units` output: unit load active sub description...
pub fn parse_units(stdout: &str) -> HashMap<String, UnitInfo> {
    let mut units = HashMap::new();
    for line in stdout.lines() {
        let parts: Vec<&str> = line
            .split_whitespace()
            .skip_while(|p| *p == "●" || *p == "*")
            .collect();
        if parts.len() < 4 {
            continue;
        }
        units.insert(
            parts[0].to_string(),
            UnitInfo {
                active_state: parts[2].to_string(),
                description: parts[4..].join(" "),
            },
        );
    }
    units
}

fn startup_type_from_state(state: &str) -> StartupType {
    match state {
        "enabled" | "enabled-runtime" => StartupType::Automatic,
        "disabled" => StartupType::Manual,
        "masked" | "masked-runtime" => StartupType::Disabled,
        _ => StartupType::Unknown,
    }
}

fn status_from_active_state(state: &str) -> ServiceStatus {
    match state {
        "active" | "reloading" | "refreshing" => ServiceStatus::Running,
        "inactive" | "failed" => ServiceStatus::Stopped,
        "activating" => ServiceStatus::StartPending,
        "deactivating" => ServiceStatus::StopPending,
        _ => ServiceStatus::Unknown,
    }
}

fn build_records(
    unit_files: &[(String, String)],
    units: &HashMap<String, UnitInfo>,
) -> Vec<ServiceRecord> {
    unit_files
        .iter()
        // Templates have no state of their own; their instances are runtime-only
        .filter(|(unit, _)| !unit.contains("@."))
        .map(|(unit, state)| {
            let info = units.get(unit);
            let display_name = info
                .map(|i| i.description.as_str())
                .filter(|d| !d.is_empty())
                .unwrap_or(unit);
            let status = info
                .map(|i| status_from_active_state(&i.active_state))
                .unwrap_or(ServiceStatus::Stopped);

            ServiceRecord::new(unit.as_str(), display_name, startup_type_from_state(state))
                .with_status(status)
        })
        .collect()
}
