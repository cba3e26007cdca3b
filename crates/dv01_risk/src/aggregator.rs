//! Trader and firm aggregation.
//!
//! [`TraderAggregator`] folds one trader's enriched positions into a
//! [`TraderSummary`]; [`FirmAggregator`] sums trader summaries field by field
//! into a [`FirmSummary`] and expresses its P&L against margin and capital.
//!
//! Firm totals are never re-derived from positions, so
//! `firm.total_dv01 == sum(trader.total_dv01)` holds exactly.

use crate::enriched::EnrichedPosition;
use crate::pnl::{PnlProjector, ShockPnl};
use dv01_core::{FirmFinancials, TraderId};

#[cfg(feature = "serde")]
use serde::Serialize;

/// One trader's rolled-up risk.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TraderSummary {
    /// Trader.
    pub trader: TraderId,
    /// Number of positions folded in.
    pub position_count: usize,
    /// Signed sum of position DV01 (longs and shorts net out).
    pub total_dv01: f64,
    /// Sum of absolute position DV01.
    pub gross_dv01: f64,
    /// Fixed-shock P&L on `total_dv01`, in configured shock order.
    pub fixed_shock_pnl: Vec<ShockPnl>,
    /// Sum of position scenario P&L.
    pub scenario_pnl: f64,
    /// Number of positions above the concentration limit.
    pub breach_count: usize,
}

impl TraderSummary {
    /// Fixed-shock P&L for a given shock size, if that shock is configured.
    pub fn pnl_for_shock(&self, shock_bp: i32) -> Option<f64> {
        find_shock(&self.fixed_shock_pnl, shock_bp)
    }

    /// True for a trader without positions. Degenerate but valid.
    pub fn is_empty(&self) -> bool {
        self.position_count == 0
    }

    /// True when at least one position breaches the limit.
    pub fn has_breach(&self) -> bool {
        self.breach_count > 0
    }
}

fn find_shock(entries: &[ShockPnl], shock_bp: i32) -> Option<f64> {
    entries
        .iter()
        .find(|e| e.shock_bp == shock_bp)
        .map(|e| e.pnl)
}

/// Folds a trader's enriched positions into a [`TraderSummary`].
#[derive(Clone, Copy, Debug)]
pub struct TraderAggregator<'a> {
    projector: PnlProjector<'a>,
}

impl<'a> TraderAggregator<'a> {
    /// Creates an aggregator projecting fixed shocks with `projector`.
    pub fn new(projector: PnlProjector<'a>) -> Self {
        Self { projector }
    }

    /// Aggregates one trader. An empty slice yields an all-zero summary.
    pub fn aggregate(&self, trader: &TraderId, positions: &[EnrichedPosition]) -> TraderSummary {
        let total_dv01: f64 = positions.iter().map(|p| p.dv01).sum();
        let gross_dv01: f64 = positions.iter().map(|p| p.abs_dv01).sum();
        let scenario_pnl: f64 = positions.iter().map(|p| p.stress_pnl).sum();
        let breach_count = positions.iter().filter(|p| p.breach).count();

        TraderSummary {
            trader: trader.clone(),
            position_count: positions.len(),
            total_dv01,
            gross_dv01,
            fixed_shock_pnl: self.projector.project_fixed(total_dv01),
            scenario_pnl,
            breach_count,
        }
    }
}

/// A fixed-shock P&L expressed as a fraction of a reference amount.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ShockRatio {
    /// Shock size in basis points.
    pub shock_bp: i32,
    /// P&L divided by the reference amount (0.075 means 7.5%).
    pub ratio: f64,
}

/// Every firm P&L figure divided by one reference amount.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RatioSet {
    /// The reference amount used as denominator.
    pub denominator: f64,
    /// One ratio per fixed shock.
    pub fixed_shock: Vec<ShockRatio>,
    /// Scenario P&L ratio.
    pub scenario: f64,
}

impl RatioSet {
    /// Builds the ratio set, or `None` when the denominator is absent or zero.
    pub fn compute(
        fixed_shock_pnl: &[ShockPnl],
        scenario_pnl: f64,
        denominator: Option<f64>,
    ) -> Option<Self> {
        let denominator = denominator.filter(|d| *d != 0.0)?;
        Some(Self {
            denominator,
            fixed_shock: fixed_shock_pnl
                .iter()
                .map(|e| ShockRatio {
                    shock_bp: e.shock_bp,
                    ratio: e.pnl / denominator,
                })
                .collect(),
            scenario: scenario_pnl / denominator,
        })
    }

    /// Ratio for a given shock size, if that shock is configured.
    pub fn ratio_for_shock(&self, shock_bp: i32) -> Option<f64> {
        self.fixed_shock
            .iter()
            .find(|r| r.shock_bp == shock_bp)
            .map(|r| r.ratio)
    }
}

/// Firm-wide roll-up of every trader summary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FirmSummary {
    /// Number of traders folded in.
    pub trader_count: usize,
    /// Sum of trader `total_dv01`.
    pub total_dv01: f64,
    /// Sum of trader `gross_dv01`.
    pub gross_dv01: f64,
    /// Per-shock sum of trader fixed-shock P&L.
    pub fixed_shock_pnl: Vec<ShockPnl>,
    /// Sum of trader scenario P&L.
    pub scenario_pnl: f64,
    /// Sum of trader breach counts.
    pub breach_count: usize,
    /// Ratios against margin used; `None` when margin is unknown or zero.
    pub margin_ratios: Option<RatioSet>,
    /// Ratios against capital; `None` when capital is unknown or zero.
    pub capital_ratios: Option<RatioSet>,
}

impl FirmSummary {
    /// Firm fixed-shock P&L for a given shock size.
    pub fn pnl_for_shock(&self, shock_bp: i32) -> Option<f64> {
        find_shock(&self.fixed_shock_pnl, shock_bp)
    }

    /// True when any trader has a breach.
    pub fn has_breaches(&self) -> bool {
        self.breach_count > 0
    }
}

/// Folds trader summaries into a [`FirmSummary`].
#[derive(Clone, Copy, Debug)]
pub struct FirmAggregator<'a> {
    fixed_shocks_bp: &'a [i32],
    financials: &'a FirmFinancials,
}

impl<'a> FirmAggregator<'a> {
    /// Creates a firm aggregator.
    pub fn new(fixed_shocks_bp: &'a [i32], financials: &'a FirmFinancials) -> Self {
        Self {
            fixed_shocks_bp,
            financials,
        }
    }

    /// Sums the summaries in the given order and derives ratios.
    pub fn aggregate<'s, I>(&self, summaries: I) -> FirmSummary
    where
        I: IntoIterator<Item = &'s TraderSummary>,
    {
        let mut trader_count = 0;
        let mut total_dv01 = 0.0;
        let mut gross_dv01 = 0.0;
        let mut scenario_pnl = 0.0;
        let mut breach_count = 0;
        let mut fixed_shock_pnl: Vec<ShockPnl> = self
            .fixed_shocks_bp
            .iter()
            .map(|&shock_bp| ShockPnl { shock_bp, pnl: 0.0 })
            .collect();

        for summary in summaries {
            trader_count += 1;
            total_dv01 += summary.total_dv01;
            gross_dv01 += summary.gross_dv01;
            scenario_pnl += summary.scenario_pnl;
            breach_count += summary.breach_count;
            for entry in &mut fixed_shock_pnl {
                if let Some(pnl) = summary.pnl_for_shock(entry.shock_bp) {
                    entry.pnl += pnl;
                }
            }
        }

        let margin_ratios =
            RatioSet::compute(&fixed_shock_pnl, scenario_pnl, self.financials.margin_used());
        let capital_ratios =
            RatioSet::compute(&fixed_shock_pnl, scenario_pnl, self.financials.capital());

        FirmSummary {
            trader_count,
            total_dv01,
            gross_dv01,
            fixed_shock_pnl,
            scenario_pnl,
            breach_count,
            margin_ratios,
            capital_ratios,
        }
    }
}
