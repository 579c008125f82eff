//! Config command - show and change settings.json

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;
use svcsnap_core::config::{Backend, Config};

use super::{get_app_dir, tracked};
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a setting (snapshot-dir, backend, shell, codepage, systemd-user)
    Set {
        key: String,
        value: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    tracked("config", |_| {
        let app_dir = get_app_dir()?;
        std::fs::create_dir_all(&app_dir)
            .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;
        let mut config = Config::load(&app_dir)?;

        match command {
            ConfigCommands::Show { json } => {
                if json {
                    return output::json(&json!({
                        "appDir": app_dir,
                        "snapshotDir": config.snapshot_dir,
                        "backend": config.backend,
                        "shell": config.shell,
                        "codepage": config.codepage,
                        "systemdUser": config.systemd_user,
                    }));
                }
                println!("{}", "Configuration".bold());
                println!("  App directory: {}", app_dir.display());
                println!("  Snapshot directory: {}", config.snapshot_dir.display());
                println!("  Backend: {}", config.backend);
                println!("  Shell: {}", config.shell);
                println!("  Code page: {}", config.codepage);
                println!("  systemd user instance: {}", config.systemd_user);
            }
            ConfigCommands::Set { key, value } => {
                match key.as_str() {
                    "snapshot-dir" => config.snapshot_dir = PathBuf::from(&value),
                    "backend" => config.backend = value.parse::<Backend>()?,
                    "shell" => config.shell = value.clone(),
                    "codepage" => {
                        config.codepage = value
                            .parse()
                            .with_context(|| format!("Invalid code page \"{}\"", value))?
                    }
                    "systemd-user" => {
                        config.systemd_user = value
                            .parse()
                            .with_context(|| format!("Expected true or false, got \"{}\"", value))?
                    }
                    other => bail!("Unknown setting \"{}\"", other),
                }
                config.save(&app_dir)?;
                output::success(&format!("Set {} = {}", key, value));
            }
        }
        Ok(())
    })
}
