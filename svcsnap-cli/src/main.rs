//! svcsnap CLI - snapshot and restore OS service startup types

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{compare, config, diff, list, logs, print, restore, save};

/// svcsnap - save, compare and restore service startup types
#[derive(Parser)]
#[command(name = "svcsnap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save the current startup types to a snapshot file
    Save {
        /// Destination file (defaults to a timestamped file in the snapshot directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the live services
    Print {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show drift between a snapshot and the live system
    Diff {
        /// Snapshot file
        file: PathBuf,
        /// Strip per-instance suffixes (e.g. "_1a2b3c") from service names
        #[arg(long)]
        ignore_suffix: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two snapshot files field by field
    Compare {
        /// Older snapshot
        old: PathBuf,
        /// Newer snapshot
        new: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply the startup types saved in a snapshot
    Restore {
        /// Snapshot file
        file: PathBuf,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List saved snapshots
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Save { .. } => "save",
            Commands::Print { .. } => "print",
            Commands::Diff { .. } => "diff",
            Commands::Compare { .. } => "compare",
            Commands::Restore { .. } => "restore",
            Commands::List { .. } => "list",
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }

    fn wants_json(&self) -> bool {
        match self {
            Commands::Save { json, .. }
            | Commands::Print { json }
            | Commands::Diff { json, .. }
            | Commands::Compare { json, .. }
            | Commands::Restore { json, .. }
            | Commands::List { json } => *json,
            Commands::Config { command: config::ConfigCommands::Show { json } } => *json,
            Commands::Config { .. } | Commands::Logs { .. } => false,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();
    let json = cli.command.wants_json();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                if let Err(print_err) = commands::print_json_failure(name, &e) {
                    eprintln!("{}", print_err);
                }
            } else {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Save { output, json } => save::run(output, json),
        Commands::Print { json } => print::run(json),
        Commands::Diff { file, ignore_suffix, json } => diff::run(&file, ignore_suffix, json),
        Commands::Compare { old, new, json } => compare::run(&old, &new, json),
        Commands::Restore { file, force, json } => restore::run(&file, force, json),
        Commands::List { json } => list::run(json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
