mod config;
mod form;
mod init;
mod medicines;
mod prescriptions;
mod prompts;
mod storage;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use rxdesk_logging::{LogFormat, WorkerGuard};

use crate::config::{FileConfig, Overrides, Settings};
use crate::medicines::MedicinesAction;
use crate::prescriptions::PrescriptionsAction;
use crate::storage::{Backend, Desk};

#[derive(Parser, Debug)]
#[command(
    name = "rxdesk",
    about = "Pharmacy prescription and inventory desk",
    version,
    author
)]
struct Cli {
    /// Storage backend (overrides config)
    #[arg(long, value_enum, global = true)]
    backend: Option<Backend>,

    /// Slot directory (json) or database file (sqlite)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Log output format (overrides config)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    /// More diagnostics: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive setup of the global config
    Init,
    /// Manage prescriptions
    #[command(alias = "rx")]
    Prescriptions {
        #[command(subcommand)]
        action: PrescriptionsAction,
    },
    /// Manage the medicine inventory
    #[command(alias = "meds")]
    Medicines {
        #[command(subcommand)]
        action: MedicinesAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        backend: cli.backend,
        data: cli.data.clone(),
        log_format: cli.log_format.map(Into::into),
        verbose: cli.verbose,
    };

    match cli.command {
        // Init runs before any config is read so a broken file can be replaced
        Commands::Init => init::handle_init(),
        Commands::Prescriptions { action } => {
            let (desk, _log_guard) = open_desk(&overrides)?;
            prescriptions::handle_prescriptions_command(action, &desk, today())
        }
        Commands::Medicines { action } => {
            let (desk, _log_guard) = open_desk(&overrides)?;
            medicines::handle_medicines_command(action, &desk, today())
        }
    }
}

/// Resolve settings, start logging and open the stores' backend.
fn open_desk(overrides: &Overrides) -> Result<(Desk, Option<WorkerGuard>)> {
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = FileConfig::load_layered(FileConfig::global_path().as_deref(), &working_dir)?;
    let settings = Settings::resolve(config, overrides)?;

    let guard = rxdesk_logging::init_tracing(
        &settings.log_level,
        settings.log_format,
        settings.log_dir.as_deref(),
    );
    tracing::debug!(backend = %settings.backend, "Resolved settings");

    let desk = Desk::open(&settings)?;
    Ok((desk, guard))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
