//! DV01, exposure normalisation and concentration breach detection.
//!
//! This module provides the per-position stages of the pipeline:
//! - [`compute_dv01`]: contracts times tick value
//! - [`ExposureNormalizer`]: each position's share of its trader's gross DV01
//! - [`BreachDetector`]: shares strictly above the configured limit
//!
//! A trader whose gross DV01 is zero (or overflows) has no meaningful shares.
//! Those are reported as `None`, never as `0.0` or NaN, and `None` is never
//! a breach.

use crate::enriched::EnrichedPosition;
use dv01_core::Position;

/// Signed DV01 of a position: `contracts * tick_value`.
///
/// # Examples
///
/// ```
/// use dv01_core::Position;
/// use dv01_risk::exposure::compute_dv01;
///
/// assert_eq!(compute_dv01(&Position::new("A", "10Y", -40), 25.0), -1000.0);
/// ```
#[inline]
pub fn compute_dv01(position: &Position, tick_value: f64) -> f64 {
    position.contracts() as f64 * tick_value
}

/// Strict limit test: exactly at the limit is not a breach.
#[inline]
pub fn is_breach(pct_of_total: Option<f64>, limit_pct: f64) -> bool {
    matches!(pct_of_total, Some(pct) if pct > limit_pct)
}

/// Exposure figures of one position relative to its trader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExposureShare {
    /// Signed DV01.
    pub dv01: f64,
    /// Absolute DV01.
    pub abs_dv01: f64,
    /// Percentage of the trader's gross DV01; `None` when that total is zero
    /// or not finite.
    pub pct_of_total: Option<f64>,
}

/// Computes each position's share of total absolute exposure.
#[derive(Clone, Copy, Debug)]
pub struct ExposureNormalizer {
    tick_value: f64,
}

impl ExposureNormalizer {
    /// Creates a normaliser for the given tick value.
    pub fn new(tick_value: f64) -> Self {
        Self { tick_value }
    }

    /// Sum of absolute DV01 over the positions.
    pub fn gross_dv01(&self, positions: &[Position]) -> f64 {
        positions
            .iter()
            .map(|p| compute_dv01(p, self.tick_value).abs())
            .sum()
    }

    /// Normalises one trader's positions, preserving input order.
    pub fn normalize(&self, positions: &[Position]) -> Vec<ExposureShare> {
        let dv01s: Vec<f64> = positions
            .iter()
            .map(|p| compute_dv01(p, self.tick_value))
            .collect();
        let gross: f64 = dv01s.iter().map(|d| d.abs()).sum();

        dv01s
            .into_iter()
            .map(|dv01| {
                let abs_dv01 = dv01.abs();
                let pct_of_total =
                    (gross.is_finite() && gross > 0.0).then(|| abs_dv01 / gross * 100.0);
                ExposureShare {
                    dv01,
                    abs_dv01,
                    pct_of_total,
                }
            })
            .collect()
    }
}

/// Flags positions whose exposure share exceeds the limit.
#[derive(Clone, Copy, Debug)]
pub struct BreachDetector {
    limit_pct: f64,
}

impl BreachDetector {
    /// Creates a detector with the given limit percentage.
    pub fn new(limit_pct: f64) -> Self {
        Self { limit_pct }
    }

    /// Returns the limit percentage.
    pub fn limit_pct(&self) -> f64 {
        self.limit_pct
    }

    /// Tests a single share.
    #[inline]
    pub fn is_breach(&self, pct_of_total: Option<f64>) -> bool {
        is_breach(pct_of_total, self.limit_pct)
    }

    /// Filters the breached subset of already enriched positions.
    pub fn breaches<'a>(
        &self,
        positions: &'a [EnrichedPosition],
    ) -> impl Iterator<Item = &'a EnrichedPosition> + 'a {
        let limit_pct = self.limit_pct;
        positions
            .iter()
            .filter(move |p| is_breach(p.pct_of_total, limit_pct))
    }
}
