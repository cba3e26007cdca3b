//! Linear P&L projection.
//!
//! Two modes, both pure functions of DV01 and basis-point inputs:
//! - fixed parallel shocks applied to a trader's signed total DV01
//! - a per-tenor [`ScenarioShift`] applied position by position
//!
//! Sign convention: a positive figure is the outcome of the stated yield
//! move. [`PnlDirection`] attaches the desk's Gain/Loss label for display
//! and never changes the number.

use dv01_core::{ScenarioShift, Tenor};
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// P&L of one fixed parallel shock.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ShockPnl {
    /// Shock size in basis points.
    pub shock_bp: i32,
    /// Projected P&L.
    pub pnl: f64,
}

/// Fixed-shock P&L: `total_dv01 * shock_bp`.
#[inline]
pub fn fixed_shock_pnl(total_dv01: f64, shock_bp: i32) -> f64 {
    total_dv01 * f64::from(shock_bp)
}

/// Scenario P&L of one position: `dv01 * shift_bp`.
#[inline]
pub fn stress_pnl(dv01: f64, shift_bp: i32) -> f64 {
    dv01 * f64::from(shift_bp)
}

/// Display label for a projected P&L figure.
///
/// A positive DV01-times-shock figure is read as a loss when yields rise;
/// anything else, zero included, is labelled a gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PnlDirection {
    /// Non-positive figure.
    Gain,
    /// Positive figure.
    Loss,
}

impl PnlDirection {
    /// Classifies a P&L figure by sign.
    pub fn from_pnl(pnl: f64) -> Self {
        if pnl > 0.0 {
            PnlDirection::Loss
        } else {
            PnlDirection::Gain
        }
    }

    /// Label text.
    pub fn label(&self) -> &'static str {
        match self {
            PnlDirection::Gain => "Gain",
            PnlDirection::Loss => "Loss",
        }
    }
}

impl fmt::Display for PnlDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Projects fixed-shock and scenario P&L for one evaluation pass.
///
/// Borrows the shock list and the scenario; both are read-only for the
/// whole pass and shared by every trader.
#[derive(Clone, Copy, Debug)]
pub struct PnlProjector<'a> {
    fixed_shocks_bp: &'a [i32],
    scenario: &'a ScenarioShift,
}

impl<'a> PnlProjector<'a> {
    /// Creates a projector.
    pub fn new(fixed_shocks_bp: &'a [i32], scenario: &'a ScenarioShift) -> Self {
        Self {
            fixed_shocks_bp,
            scenario,
        }
    }

    /// Configured fixed shocks.
    pub fn fixed_shocks_bp(&self) -> &'a [i32] {
        self.fixed_shocks_bp
    }

    /// P&L of every fixed shock for a signed total DV01, in shock order.
    pub fn project_fixed(&self, total_dv01: f64) -> Vec<ShockPnl> {
        self.fixed_shocks_bp
            .iter()
            .map(|&shock_bp| ShockPnl {
                shock_bp,
                pnl: fixed_shock_pnl(total_dv01, shock_bp),
            })
            .collect()
    }

    /// Scenario shift for a tenor (zero when unmapped).
    #[inline]
    pub fn shift_for(&self, tenor: &Tenor) -> i32 {
        self.scenario.shift_for(tenor)
    }

    /// Scenario P&L of one position, with the shift that produced it.
    #[inline]
    pub fn project_stress(&self, tenor: &Tenor, dv01: f64) -> (i32, f64) {
        let shift_bp = self.shift_for(tenor);
        (shift_bp, stress_pnl(dv01, shift_bp))
    }
}
