//! Per-position evaluation result.

use dv01_core::{Tenor, TraderId};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A position together with every figure derived from it in one pass.
///
/// Built once from an immutable `Position`; never updated in place.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EnrichedPosition {
    /// Owning trader.
    pub trader: TraderId,
    /// Tenor bucket.
    pub tenor: Tenor,
    /// Signed contract count.
    pub contracts: i64,
    /// Signed DV01 (contracts times tick value).
    pub dv01: f64,
    /// Absolute DV01.
    pub abs_dv01: f64,
    /// Share of the trader's gross DV01 in percent; `None` when not computable.
    pub pct_of_total: Option<f64>,
    /// Whether `pct_of_total` is strictly above the limit.
    pub breach: bool,
    /// Scenario shift applied to this tenor, in basis points.
    pub shift_bp: i32,
    /// Scenario P&L (dv01 times shift).
    pub stress_pnl: f64,
}
