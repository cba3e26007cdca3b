//! DV01 CLI - Command Line Risk Reports for Rates Futures Desks
//!
//! This is the operational entry point for the DV01 risk monitor.
//!
//! # Commands
//!
//! - `dv01 report --positions <file>...` - Evaluate positions and print the report
//! - `dv01 check` - Validate and print the effective configuration
//!
//! # Configuration
//!
//! Settings are layered: flags override environment variables
//! (`DV01_TICK_VALUE`, `DV01_LIMIT_PCT`, `DV01_FIXED_SHOCKS_BP`), which
//! override the config file (`--config`, or `dv01.toml` when present),
//! which overrides the built-in defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod loader;
mod report;

pub use error::{CliError, Result};

use commands::report::{OutputFormat, ReportArgs};
use config::{CliOverrides, FileSettings, DEFAULT_LOG_LEVEL};

/// DV01 Risk Monitor CLI
#[derive(Parser)]
#[command(name = "dv01")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (defaults to ./dv01.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Risk parameter flags shared by every command.
#[derive(clap::Args, Debug, Default)]
struct RiskFlags {
    /// Monetary value per contract per basis point
    #[arg(long)]
    tick_value: Option<f64>,

    /// DV01 concentration limit, percent of a trader's gross DV01
    #[arg(long)]
    limit_pct: Option<f64>,

    /// Fixed parallel shock in basis points (repeatable; replaces the defaults)
    #[arg(long = "shock", allow_hyphen_values = true)]
    shocks: Vec<i32>,
}

impl RiskFlags {
    fn into_overrides(self) -> CliOverrides {
        CliOverrides {
            tick_value: self.tick_value,
            limit_pct: self.limit_pct,
            fixed_shocks_bp: self.shocks,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate position files and print the DV01 risk report
    Report {
        /// Position CSV file; repeat for one sheet per trader
        #[arg(short, long = "positions", required = true)]
        positions: Vec<PathBuf>,

        /// Scenario TOML file with a [shifts] table
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Scenario shift as TENOR=BP, e.g. 10Y=-5 (repeatable)
        #[arg(long = "shift", allow_hyphen_values = true)]
        shifts: Vec<String>,

        /// Firm margin used, overriding the position files
        #[arg(long)]
        margin_used: Option<f64>,

        /// Firm capital, overriding the position files
        #[arg(long)]
        capital: Option<f64>,

        #[command(flatten)]
        risk: RiskFlags,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Check the effective configuration
    Check {
        #[command(flatten)]
        risk: RiskFlags,
    },
}

fn init_tracing(verbose: bool, configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose {
            "debug"
        } else {
            configured.unwrap_or(DEFAULT_LOG_LEVEL)
        };
        EnvFilter::new(level)
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli, settings: FileSettings) -> Result<()> {
    match cli.command {
        Commands::Report {
            positions,
            scenario,
            shifts,
            margin_used,
            capital,
            risk,
            format,
        } => {
            let args = ReportArgs {
                positions,
                scenario_file: scenario,
                shifts,
                margin_used,
                capital,
                overrides: risk.into_overrides(),
                format,
            };
            commands::report::run(settings, &args)
        }
        Commands::Check { risk } => commands::check::run(settings, &risk.into_overrides()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = FileSettings::load(cli.config.as_deref());
    let log_level = settings
        .as_ref()
        .ok()
        .and_then(|s| s.log_level.clone());
    init_tracing(cli.verbose, log_level.as_deref());

    if cli.verbose {
        debug!("Verbose mode enabled");
    }

    let result = settings.and_then(|settings| run(cli, settings));
    if let Err(ref e) = result {
        error!("{}", e);
    }
    result
}
