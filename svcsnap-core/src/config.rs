//! Configuration management
//!
//! Settings live in `settings.json` inside the app directory:
//! ```json
//! {
//!   "snapshotDir": "C:\\backups\\services",
//!   "backend": "powershell",
//!   "shell": "pwsh",
//!   "codepage": 65001,
//!   "systemdUser": false
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// UTF-8 console code page
pub const DEFAULT_CODEPAGE: u32 = 65001;
pub const DEFAULT_SHELL: &str = "pwsh";

/// OS service manager backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    PowerShell,
    Systemd,
}

impl Backend {
    /// Backend native to the platform this binary was built for
    pub fn native() -> Self {
        if cfg!(windows) {
            Backend::PowerShell
        } else {
            Backend::Systemd
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::PowerShell => "powershell",
            Backend::Systemd => "systemd",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "powershell" | "pwsh" => Ok(Backend::PowerShell),
            "systemd" | "systemctl" => Ok(Backend::Systemd),
            other => Err(Error::Config(format!("Unknown backend \"{}\"", other))),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    snapshot_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backend: Option<Backend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    codepage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    systemd_user: Option<bool>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Environment overrides applied on top of settings.json
#[derive(Debug, Clone, Default)]
struct Overrides {
    backend: Option<String>,
    snapshot_dir: Option<PathBuf>,
}

impl Overrides {
    fn from_env() -> Self {
        Self {
            backend: std::env::var("SVCSNAP_BACKEND")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            snapshot_dir: std::env::var_os("SVCSNAP_SNAPSHOT_DIR")
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Values as resolved at load time, before any caller changes
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    snapshot_dir: PathBuf,
    backend: Backend,
    shell: String,
    codepage: u32,
    systemd_user: bool,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Where `save` writes timestamped snapshots
    pub snapshot_dir: PathBuf,
    pub backend: Backend,
    /// PowerShell executable
    pub shell: String,
    /// Console code page the PowerShell adapter switches to
    pub codepage: u32,
    /// Manage the per-user systemd instance instead of the system one
    pub systemd_user: bool,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
    _resolved: Option<Resolved>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("."),
            backend: Backend::native(),
            shell: DEFAULT_SHELL.to_string(),
            codepage: DEFAULT_CODEPAGE,
            systemd_user: false,
            _raw_settings: SettingsFile::default(),
            _resolved: None,
        }
    }
}

impl Config {
    /// Load config from the app directory
    ///
    /// Environment overrides (checked after settings.json):
    /// - `SVCSNAP_BACKEND`: powershell | systemd
    /// - `SVCSNAP_SNAPSHOT_DIR`: snapshot directory
    pub fn load(app_dir: &Path) -> Result<Self> {
        Self::load_with(app_dir, Overrides::from_env())
    }

    fn load_with(app_dir: &Path, overrides: Overrides) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("Invalid {}: {}", settings_path.display(), e))
            })?
        } else {
            SettingsFile::default()
        };

        let backend = match &overrides.backend {
            Some(value) => value.parse()?,
            None => raw.backend.unwrap_or_else(Backend::native),
        };

        let snapshot_dir = match overrides.snapshot_dir {
            Some(dir) => dir,
            None => match &raw.snapshot_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir()?,
            },
        };

        let resolved = Resolved {
            snapshot_dir,
            backend,
            shell: raw.shell.clone().unwrap_or_else(|| DEFAULT_SHELL.to_string()),
            codepage: raw.codepage.unwrap_or(DEFAULT_CODEPAGE),
            systemd_user: raw.systemd_user.unwrap_or(false),
        };

        Ok(Self {
            snapshot_dir: resolved.snapshot_dir.clone(),
            backend: resolved.backend,
            shell: resolved.shell.clone(),
            codepage: resolved.codepage,
            systemd_user: resolved.systemd_user,
            _raw_settings: raw,
            _resolved: Some(resolved),
        })
    }

    /// Save config to the app directory
    /// Preserves other settings the CLI doesn't manage
    ///
    /// Only values changed since load are written; defaults and environment
    /// overrides never end up in the file. A config that was not loaded
    /// writes every value.
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        let resolved = self._resolved.as_ref();
        if resolved.map_or(true, |r| r.snapshot_dir != self.snapshot_dir) {
            settings.snapshot_dir = Some(self.snapshot_dir.clone());
        }
        if resolved.map_or(true, |r| r.backend != self.backend) {
            settings.backend = Some(self.backend);
        }
        if resolved.map_or(true, |r| r.shell != self.shell) {
            settings.shell = Some(self.shell.clone());
        }
        if resolved.map_or(true, |r| r.codepage != self.codepage) {
            settings.codepage = Some(self.codepage);
        }
        if resolved.map_or(true, |r| r.systemd_user != self.systemd_user) {
            settings.systemd_user = Some(self.systemd_user);
        }

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("PowerShell".parse::<Backend>().unwrap(), Backend::PowerShell);
        assert_eq!("systemctl".parse::<Backend>().unwrap(), Backend::Systemd);
        assert!(matches!("launchd".parse::<Backend>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"backend": "systemd", "theme": "dark"}"#,
        )
        .unwrap();

        let mut config = Config::load_with(dir.path(), Overrides::default()).unwrap();
        config.codepage = 866;
        config.save(dir.path()).unwrap();

        let saved = read_settings(dir.path());
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["codepage"], 866);
        assert_eq!(saved["backend"], "systemd");
        assert!(saved.get("snapshotDir").is_none());
        assert!(saved.get("shell").is_none());
        assert!(saved.get("systemdUser").is_none());
    }

    #[test]
    fn test_save_does_not_pin_env_overrides() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"snapshotDir": "/from/file", "backend": "powershell"}"#,
        )
        .unwrap();

        let overrides = Overrides {
            backend: Some("systemd".to_string()),
            snapshot_dir: Some(PathBuf::from("/from/env")),
        };
        let mut config = Config::load_with(dir.path(), overrides).unwrap();
        assert_eq!(config.snapshot_dir, PathBuf::from("/from/env"));
        assert_eq!(config.backend, Backend::Systemd);

        config.codepage = 866;
        config.save(dir.path()).unwrap();

        let saved = read_settings(dir.path());
        assert_eq!(saved["snapshotDir"], "/from/file");
        assert_eq!(saved["backend"], "powershell");
        assert_eq!(saved["codepage"], 866);
        assert!(saved.get("shell").is_none());
    }

    #[test]
    fn test_save_writes_changed_overridden_value() {
        let dir = tempdir().unwrap();
        let overrides = Overrides {
            backend: None,
            snapshot_dir: Some(PathBuf::from("/from/env")),
        };
        let mut config = Config::load_with(dir.path(), overrides).unwrap();
        config.snapshot_dir = PathBuf::from("/chosen");
        config.save(dir.path()).unwrap();

        let saved = read_settings(dir.path());
        assert_eq!(saved["snapshotDir"], "/chosen");
        assert!(saved.get("backend").is_none());
        assert!(saved.get("codepage").is_none());
    }

    fn read_settings(dir: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(dir.join("settings.json")).unwrap()).unwrap()
    }

    #[test]
    fn test_invalid_settings_is_config_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
        assert!(matches!(
            Config::load_with(dir.path(), Overrides::default()),
            Err(Error::Config(_))
        ));
    }
}
