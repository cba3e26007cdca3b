//! Report command implementation
//!
//! Loads position files, evaluates them with dv01_risk and prints the
//! report to stdout.

use chrono::Local;
use clap::ValueEnum;
use dv01_core::FirmFinancials;
use dv01_risk::{Evaluation, RiskEngine};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{build_config, build_scenario, CliOverrides, FileSettings};
use crate::loader::load_feed;
use crate::report::{render_json, render_table, ReportContext};
use crate::{CliError, Result};

/// Report output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Arguments of the report command.
#[derive(Clone, Debug, Default)]
pub struct ReportArgs {
    /// Position CSV files, evaluated together
    pub positions: Vec<PathBuf>,
    /// Scenario TOML file
    pub scenario_file: Option<PathBuf>,
    /// `TENOR=BP` shifts, applied after the scenario file
    pub shifts: Vec<String>,
    /// Margin used, overriding the files
    pub margin_used: Option<f64>,
    /// Capital, overriding the files
    pub capital: Option<f64>,
    /// Risk parameter overrides
    pub overrides: CliOverrides,
    /// Output format
    pub format: OutputFormat,
}

/// Run the report command
pub fn run(settings: FileSettings, args: &ReportArgs) -> Result<()> {
    let output = build_report(settings, args)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn build_report(settings: FileSettings, args: &ReportArgs) -> Result<String> {
    if args.positions.is_empty() {
        return Err(CliError::InvalidArgument(
            "at least one --positions file is required".to_string(),
        ));
    }

    let config = build_config(settings.risk, &args.overrides)?;
    let scenario = build_scenario(args.scenario_file.as_deref(), &args.shifts)?;
    let engine = RiskEngine::new(config)?;

    info!("Loading {} position file(s)", args.positions.len());
    let feed = load_feed(&args.positions)?;
    let financials = apply_financial_overrides(feed.financials, args)?;

    let mut evaluation: Evaluation = engine.evaluate(&feed.book, &scenario, &financials);
    evaluation.rejected = feed.rejected;
    if evaluation.has_breaches() {
        warn!(
            breaches = evaluation.firm.breach_count,
            "DV01 limit breaches detected"
        );
    }

    let context = ReportContext {
        generated_at: Local::now(),
        config: engine.config(),
        scenario: &scenario,
        financials: &financials,
    };
    match args.format {
        OutputFormat::Table => Ok(render_table(&context, &evaluation)),
        OutputFormat::Json => render_json(&context, &evaluation),
    }
}

fn apply_financial_overrides(
    financials: FirmFinancials,
    args: &ReportArgs,
) -> Result<FirmFinancials> {
    let invalid = |error| CliError::Input {
        source_name: "command line".to_string(),
        error,
    };
    let mut financials = financials;
    if args.margin_used.is_some() {
        financials = financials.with_margin_used(args.margin_used).map_err(invalid)?;
    }
    if args.capital.is_some() {
        financials = financials.with_capital(args.capital).map_err(invalid)?;
    }
    Ok(financials)
}
