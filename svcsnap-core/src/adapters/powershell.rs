//! PowerShell service manager adapter (Windows)
//!
//! Enumerates services with `Get-Service` and changes startup types with
//! `Set-Service`. Output is requested as JSON with enum values as strings.

use std::process::{Command, Output};

use serde_json::Value;

use crate::domain::result::{Error, Result};
use crate::domain::{ServiceRecord, ServiceStatus, StartupType};
use crate::ports::{EnumerationResult, ServiceManager};

const LIST_SCRIPT: &str = "Get-Service \
    | Select-Object -Property Name,DisplayName,Status,StartType \
    | ConvertTo-Json -EnumsAsStrings";

/// Service manager backed by `pwsh -Command`
pub struct PowerShellServiceManager {
    shell: String,
    codepage: u32,
}

impl PowerShellServiceManager {
    /// `codepage` is the console output encoding the scripts switch to
    pub fn new(shell: impl Into<String>, codepage: u32) -> Self {
        Self {
            shell: shell.into(),
            codepage,
        }
    }

    fn run(&self, script: &str) -> std::io::Result<Output> {
        let script = format!(
            "[Console]::OutputEncoding = [Text.Encoding]::GetEncoding({})\n{}",
            self.codepage, script
        );
        Command::new(&self.shell)
            .args(["-NoProfile", "-NonInteractive", "-Command", &script])
            .output()
    }
}

impl ServiceManager for PowerShellServiceManager {
    fn name(&self) -> &str {
        "powershell"
    }

    fn list_services(&self) -> Result<EnumerationResult> {
        let output = self
            .run(LIST_SCRIPT)
            .map_err(|e| Error::enumeration(format!("Failed to run {}: {}", self.shell, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let services = parse_services(&stdout).map_err(|e| {
            Error::enumeration(format!(
                "Error parsing services: {}\n--- stdout ---\n{}\n--- stderr ---\n{}",
                e,
                stdout.trim(),
                stderr.trim()
            ))
        })?;

        // Get-Service exits non-zero when some services cannot be queried but still lists the rest
        let mut warnings = Vec::new();
        if !output.status.success() {
            warnings.push(format!("Failed to get some services:\n{}", stderr.trim()));
        }

        Ok(EnumerationResult { services, warnings })
    }

    fn apply_startup_type(
        &self,
        name: &str,
        startup_type: StartupType,
    ) -> std::result::Result<(), String> {
        let script = set_service_script(name, startup_type)?;
        let output = self
            .run(&script)
            .map_err(|e| format!("Failed to run {}: {}", self.shell, e))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                Err(format!("{} exited with {}", self.shell, output.status))
            } else {
                Err(stderr)
            }
        }
    }
}

/// Build the `Set-Service` invocation for one service
fn set_service_script(name: &str, startup_type: StartupType) -> std::result::Result<String, String> {
    match startup_type {
        StartupType::Automatic
        | StartupType::AutomaticDelayedStart
        | StartupType::Manual
        | StartupType::Disabled => Ok(format!(
            "Set-Service -Name '{}' -StartupType {} -ErrorAction Stop",
            name.replace('\'', "''"),
            startup_type
        )),
        other => Err(format!("Startup type {} cannot be set with Set-Service", other)),
    }
}

/// Parse `ConvertTo-Json` output of Get-Service
///
/// A single service is emitted as an object rather than an array.
pub fn parse_services(stdout: &str) -> Result<Vec<ServiceRecord>> {
    let stdout = stdout.trim().trim_start_matches('\u{feff}');
    if stdout.is_empty() {
        return Ok(Vec::new());
    }

    let items = match serde_json::from_str::<Value>(stdout)? {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => return Err(Error::enumeration("Expected a JSON list of services")),
    };

    items.iter().map(parse_service).collect()
}

fn parse_service(item: &Value) -> Result<ServiceRecord> {
    let name = item
        .get("Name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::enumeration(format!("Service without a name: {}", item)))?;

    let display_name = item
        .get("DisplayName")
        .and_then(Value::as_str)
        .unwrap_or(name);

    let startup_type = match item.get("StartType") {
        Some(Value::String(s)) => s.parse().unwrap_or(StartupType::Unknown),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(StartupType::from_code)
            .unwrap_or(StartupType::Unknown),
        _ => StartupType::Unknown,
    };

    let status = match item.get("Status") {
        Some(Value::String(s)) => ServiceStatus::parse(s),
        Some(Value::Number(n)) => n.as_i64().map(status_from_code).unwrap_or(ServiceStatus::Unknown),
        _ => ServiceStatus::Unknown,
    };

    Ok(ServiceRecord::new(name, display_name, startup_type).with_status(status))
}

/// `ServiceControllerStatus` numeric values
fn status_from_code(code: i64) -> ServiceStatus {
    match code {
        1 => ServiceStatus::Stopped,
        2 => ServiceStatus::StartPending,
        3 => ServiceStatus::StopPending,
        4 => ServiceStatus::Running,
        5 => ServiceStatus::ContinuePending,
        6 => ServiceStatus::PausePending,
        7 => ServiceStatus::Paused,
        _ => ServiceStatus::Unknown,
    }
}
