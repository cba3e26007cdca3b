//! Report rendering.
//!
//! The evaluation itself carries no timestamp; the time a report was
//! generated is supplied here, at the output boundary.

use chrono::{DateTime, Local};
use dv01_core::{FirmFinancials, RejectedRecord, RiskConfig, ScenarioShift};
use dv01_risk::{Evaluation, PnlDirection, RatioSet, ShockPnl, TraderEvaluation};
use serde::Serialize;
use std::fmt::Write;

use crate::Result;

/// Everything a report shows besides the evaluation.
#[derive(Clone, Copy, Debug)]
pub struct ReportContext<'a> {
    /// When the report was generated.
    pub generated_at: DateTime<Local>,
    /// Configuration the evaluation ran with.
    pub config: &'a RiskConfig,
    /// Scenario the evaluation ran with.
    pub scenario: &'a ScenarioShift,
    /// Financials the ratios were computed against.
    pub financials: &'a FirmFinancials,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Local>,
    config: &'a RiskConfig,
    scenario: &'a ScenarioShift,
    financials: &'a FirmFinancials,
    evaluation: &'a Evaluation,
}

/// Renders the evaluation as pretty-printed JSON.
pub fn render_json(context: &ReportContext<'_>, evaluation: &Evaluation) -> Result<String> {
    let report = JsonReport {
        generated_at: context.generated_at,
        config: context.config,
        scenario: context.scenario,
        financials: context.financials,
        evaluation,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Renders the evaluation as a plain-text table report.
pub fn render_table(context: &ReportContext<'_>, evaluation: &Evaluation) -> String {
    let mut out = String::new();
    // fmt::Write into a String cannot fail.
    let _ = write_table(&mut out, context, evaluation);
    out
}

fn write_table(
    out: &mut String,
    context: &ReportContext<'_>,
    evaluation: &Evaluation,
) -> std::fmt::Result {
    let config = context.config;
    writeln!(
        out,
        "DV01 Risk Report (generated {})",
        context.generated_at.format("%Y-%m-%d %H:%M")
    )?;
    writeln!(
        out,
        "Tick value: {} per contract per bp | Limit: {:.2}% | Fixed shocks: {}",
        format_amount_precise(config.tick_value),
        config.dv01_limit_pct,
        config
            .fixed_shocks_bp
            .iter()
            .map(|s| format!("{}bp", s))
            .collect::<Vec<_>>()
            .join(", ")
    )?;
    writeln!(out, "Scenario: {}", describe_scenario(context.scenario))?;

    for trader in &evaluation.traders {
        writeln!(out)?;
        write_trader(out, trader, config.dv01_limit_pct)?;
    }

    writeln!(out)?;
    write_firm(out, evaluation)?;

    if !evaluation.rejected.is_empty() {
        writeln!(out)?;
        write_rejected(out, &evaluation.rejected)?;
    }
    Ok(())
}

fn write_trader(out: &mut String, trader: &TraderEvaluation, limit_pct: f64) -> std::fmt::Result {
    let summary = &trader.summary;
    writeln!(out, "Trader: {}", summary.trader)?;

    if summary.is_empty() {
        writeln!(out, "  (no positions)")?;
    } else {
        writeln!(
            out,
            "  {:<8} {:>10} {:>12} {:>12} {:>10} {:>7} {:>7} {:>14}",
            "Tenor", "Contracts", "DV01", "Abs DV01", "% Total", "Breach", "Shift", "Scenario P&L"
        )?;
        for p in &trader.positions {
            writeln!(
                out,
                "  {:<8} {:>10} {:>12} {:>12} {:>10} {:>7} {:>7} {:>14}",
                p.tenor.as_str(),
                p.contracts,
                format_amount(p.dv01),
                format_amount(p.abs_dv01),
                format_pct(p.pct_of_total),
                if p.breach { "YES" } else { "no" },
                format_bp(p.shift_bp),
                format_amount(p.stress_pnl),
            )?;
        }
    }

    writeln!(
        out,
        "  Total DV01: {}  Gross DV01: {}",
        format_amount(summary.total_dv01),
        format_amount(summary.gross_dv01)
    )?;
    write_pnl_lines(out, &summary.fixed_shock_pnl, summary.scenario_pnl)?;

    let breaches: Vec<_> = trader.breaches().collect();
    if !breaches.is_empty() {
        writeln!(out, "  WARNING: DV01 limit breach detected")?;
        for p in breaches {
            writeln!(
                out,
                "    {} {} > {:.2}% (DV01 {})",
                p.tenor.as_str(),
                format_pct(p.pct_of_total),
                limit_pct,
                format_amount(p.dv01)
            )?;
        }
    }
    Ok(())
}

fn write_pnl_lines(out: &mut String, fixed: &[ShockPnl], scenario_pnl: f64) -> std::fmt::Result {
    for entry in fixed {
        writeln!(
            out,
            "  P&L impact ({}bp move): {} ({})",
            entry.shock_bp,
            format_amount(entry.pnl),
            PnlDirection::from_pnl(entry.pnl)
        )?;
    }
    writeln!(
        out,
        "  Scenario P&L: {} ({})",
        format_amount(scenario_pnl),
        PnlDirection::from_pnl(scenario_pnl)
    )
}

fn write_firm(out: &mut String, evaluation: &Evaluation) -> std::fmt::Result {
    let firm = &evaluation.firm;
    writeln!(out, "Firm summary")?;
    writeln!(
        out,
        "  Traders: {}  Total DV01: {}  Gross DV01: {}  Breaches: {}",
        firm.trader_count,
        format_amount(firm.total_dv01),
        format_amount(firm.gross_dv01),
        firm.breach_count
    )?;
    write_pnl_lines(out, &firm.fixed_shock_pnl, firm.scenario_pnl)?;
    write_ratios(out, "margin", firm.margin_ratios.as_ref(), &firm.fixed_shock_pnl)?;
    write_ratios(out, "capital", firm.capital_ratios.as_ref(), &firm.fixed_shock_pnl)
}

fn write_ratios(
    out: &mut String,
    label: &str,
    ratios: Option<&RatioSet>,
    fixed: &[ShockPnl],
) -> std::fmt::Result {
    for entry in fixed {
        let ratio = ratios.and_then(|r| r.ratio_for_shock(entry.shock_bp));
        writeln!(
            out,
            "  {}bp P&L as % of {}: {}",
            entry.shock_bp,
            label,
            format_ratio(ratio)
        )?;
    }
    writeln!(
        out,
        "  Scenario P&L as % of {}: {}",
        label,
        format_ratio(ratios.map(|r| r.scenario))
    )
}

fn write_rejected(out: &mut String, rejected: &[RejectedRecord]) -> std::fmt::Result {
    writeln!(out, "Rejected rows ({})", rejected.len())?;
    for r in rejected {
        writeln!(
            out,
            "  {} row {}: {}",
            r.source.as_deref().unwrap_or("<input>"),
            r.row,
            r.error
        )?;
    }
    Ok(())
}

fn describe_scenario(scenario: &ScenarioShift) -> String {
    if scenario.is_empty() {
        return "none".to_string();
    }
    scenario
        .iter()
        .map(|(tenor, bp)| format!("{} {}", tenor, format_bp(bp)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whole-unit amount with thousands separators: `-1234567.8` -> `"-1,234,568"`.
pub fn format_amount(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && digits != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn format_amount_precise(value: f64) -> String {
    if value.fract() == 0.0 {
        format_amount(value)
    } else {
        format!("{:.2}", value)
    }
}

/// Exposure share in percent, two decimals, or `n/a`.
pub fn format_pct(pct: Option<f64>) -> String {
    pct.map_or_else(|| "n/a".to_string(), |p| format!("{:.2}%", p))
}

/// Fractional ratio as a percentage (`0.075` -> `"7.50%"`), or `n/a`.
pub fn format_ratio(ratio: Option<f64>) -> String {
    format_pct(ratio.map(|r| r * 100.0))
}

fn format_bp(bp: i32) -> String {
    format!("{:+}bp", bp)
}
