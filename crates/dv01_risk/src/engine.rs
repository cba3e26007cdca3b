//! Evaluation pipeline.
//!
//! [`RiskEngine`] runs one pass over a [`PositionBook`]:
//!
//! 1. DV01 and exposure share per position
//! 2. breach flag and scenario P&L per position
//! 3. per-trader summary (traders in parallel above a threshold)
//! 4. firm summary, folded in trader order
//!
//! A pass never mutates its inputs. Evaluating the same book with the same
//! configuration twice yields identical results.

use crate::aggregator::{FirmAggregator, FirmSummary, TraderAggregator, TraderSummary};
use crate::enriched::EnrichedPosition;
use crate::exposure::{BreachDetector, ExposureNormalizer};
use crate::parallel::{map_ordered, ParallelConfig};
use crate::pnl::PnlProjector;
use dv01_core::{
    ConfigError, FirmFinancials, Position, PositionBook, PositionRecord, RejectedRecord,
    RiskConfig, ScenarioShift, TraderId,
};
use tracing::{debug, info, info_span, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Result for one trader: enriched positions plus their summary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TraderEvaluation {
    /// Rolled-up figures.
    pub summary: TraderSummary,
    /// Positions in input order.
    pub positions: Vec<EnrichedPosition>,
}

impl TraderEvaluation {
    /// Trader identifier.
    pub fn trader(&self) -> &TraderId {
        &self.summary.trader
    }

    /// Positions above the concentration limit.
    pub fn breaches(&self) -> impl Iterator<Item = &EnrichedPosition> {
        self.positions.iter().filter(|p| p.breach)
    }

    /// True when at least one position breaches the limit.
    pub fn has_breach(&self) -> bool {
        self.summary.has_breach()
    }
}

/// Complete output of one evaluation pass.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Evaluation {
    /// Per-trader results, in trader order.
    pub traders: Vec<TraderEvaluation>,
    /// Firm roll-up.
    pub firm: FirmSummary,
    /// Records rejected during ingestion, when evaluated from raw records.
    pub rejected: Vec<RejectedRecord>,
}

impl Evaluation {
    /// Looks up one trader's result.
    pub fn trader(&self, trader: &TraderId) -> Option<&TraderEvaluation> {
        self.traders.iter().find(|t| t.trader() == trader)
    }

    /// True when any position anywhere breaches the limit.
    pub fn has_breaches(&self) -> bool {
        self.firm.has_breaches()
    }

    /// Iterates over every breached position, trader by trader.
    pub fn breaches(&self) -> impl Iterator<Item = &EnrichedPosition> {
        self.traders.iter().flat_map(TraderEvaluation::breaches)
    }
}

/// DV01 risk engine.
///
/// Holds a validated [`RiskConfig`]; construction fails on an invalid one,
/// so no pass ever starts with a bad tick value, limit or shock list.
///
/// # Examples
///
/// ```
/// use dv01_core::{FirmFinancials, Position, PositionBook, RiskConfig, ScenarioShift};
/// use dv01_risk::RiskEngine;
///
/// let engine = RiskEngine::new(RiskConfig::default()).unwrap();
/// let book = PositionBook::from_positions(vec![
///     Position::new("A", "2Y", 100),
///     Position::new("A", "10Y", -40),
/// ]);
///
/// let evaluation = engine.evaluate(&book, &ScenarioShift::new(), &FirmFinancials::unknown());
/// assert_eq!(evaluation.firm.total_dv01, 1500.0);
/// assert_eq!(evaluation.firm.pnl_for_shock(5), Some(7500.0));
/// ```
#[derive(Clone, Debug)]
pub struct RiskEngine {
    config: RiskConfig,
    parallel: ParallelConfig,
}

impl RiskEngine {
    /// Creates an engine, validating the configuration.
    pub fn new(config: RiskConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            parallel: ParallelConfig::default(),
        })
    }

    /// Replaces the parallel execution settings.
    pub fn with_parallel_config(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Active parallel settings.
    pub fn parallel_config(&self) -> &ParallelConfig {
        &self.parallel
    }

    /// Enriches and summarises one trader's positions.
    pub fn evaluate_trader(
        &self,
        trader: &TraderId,
        positions: &[Position],
        scenario: &ScenarioShift,
    ) -> TraderEvaluation {
        let projector = PnlProjector::new(&self.config.fixed_shocks_bp, scenario);
        self.evaluate_with(trader, positions, projector)
    }

    fn evaluate_with(
        &self,
        trader: &TraderId,
        positions: &[Position],
        projector: PnlProjector<'_>,
    ) -> TraderEvaluation {
        let detector = BreachDetector::new(self.config.dv01_limit_pct);
        let shares = ExposureNormalizer::new(self.config.tick_value).normalize(positions);

        let enriched: Vec<EnrichedPosition> = positions
            .iter()
            .zip(shares)
            .map(|(position, share)| {
                let (shift_bp, stress_pnl) = projector.project_stress(position.tenor(), share.dv01);
                EnrichedPosition {
                    trader: position.trader().clone(),
                    tenor: position.tenor().clone(),
                    contracts: position.contracts(),
                    dv01: share.dv01,
                    abs_dv01: share.abs_dv01,
                    pct_of_total: share.pct_of_total,
                    breach: detector.is_breach(share.pct_of_total),
                    shift_bp,
                    stress_pnl,
                }
            })
            .collect();

        let summary = TraderAggregator::new(projector).aggregate(trader, &enriched);

        if summary.is_empty() {
            debug!(trader = %trader, "Trader has no positions");
        } else if summary.gross_dv01 == 0.0 {
            debug!(trader = %trader, "Trader has zero gross DV01, exposure shares not computable");
        }
        for breach in detector.breaches(&enriched) {
            warn!(
                trader = %trader,
                tenor = %breach.tenor,
                pct_of_total = breach.pct_of_total.unwrap_or_default(),
                limit_pct = detector.limit_pct(),
                "DV01 concentration breach"
            );
        }

        TraderEvaluation {
            summary,
            positions: enriched,
        }
    }

    /// Evaluates every trader in the book and the firm roll-up.
    pub fn evaluate(
        &self,
        book: &PositionBook,
        scenario: &ScenarioShift,
        financials: &FirmFinancials,
    ) -> Evaluation {
        let traders: Vec<(&TraderId, &[Position])> = book.traders().collect();
        let _span = info_span!("evaluate", traders = traders.len()).entered();
        let parallel = self.parallel.should_parallelize(traders.len());
        debug!(
            traders = traders.len(),
            positions = book.position_count(),
            parallel,
            "Starting evaluation"
        );

        let projector = PnlProjector::new(&self.config.fixed_shocks_bp, scenario);
        let evaluations = map_ordered(&traders, &self.parallel, |(trader, positions)| {
            self.evaluate_with(trader, positions, projector)
        });

        let firm = FirmAggregator::new(&self.config.fixed_shocks_bp, financials)
            .aggregate(evaluations.iter().map(|e| &e.summary));

        info!(
            traders = firm.trader_count,
            total_dv01 = firm.total_dv01,
            breaches = firm.breach_count,
            "Evaluation complete"
        );

        Evaluation {
            traders: evaluations,
            firm,
            rejected: Vec::new(),
        }
    }

    /// Validates raw records, then evaluates the valid ones.
    ///
    /// Invalid rows are excluded and reported in [`Evaluation::rejected`].
    pub fn evaluate_records<I>(
        &self,
        records: I,
        scenario: &ScenarioShift,
        financials: &FirmFinancials,
    ) -> Evaluation
    where
        I: IntoIterator<Item = PositionRecord>,
    {
        let (book, rejected) = PositionBook::from_records(records);
        if !rejected.is_empty() {
            warn!(rejected = rejected.len(), "Rejected invalid position records");
        }
        let mut evaluation = self.evaluate(&book, scenario, financials);
        evaluation.rejected = rejected;
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dv01_core::InputError;

    fn engine() -> RiskEngine {
        RiskEngine::new(RiskConfig::default()).unwrap()
    }

    fn trader_a_book() -> PositionBook {
        PositionBook::from_positions(vec![
            Position::new("A", "2Y", 100),
            Position::new("A", "10Y", -40),
        ])
    }

    fn scenario() -> ScenarioShift {
        ScenarioShift::new().with_shift("2Y", 10).with_shift("10Y", -5)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(matches!(
            RiskEngine::new(RiskConfig::default().with_tick_value(0.0)),
            Err(ConfigError::InvalidTickValue(_))
        ));
        assert!(matches!(
            RiskEngine::new(RiskConfig::default().with_limit_pct(-1.0)),
            Err(ConfigError::InvalidLimitPct(_))
        ));
        assert!(matches!(
            RiskEngine::new(RiskConfig::default().with_fixed_shocks(vec![5, 5])),
            Err(ConfigError::DuplicateShock(5))
        ));
    }

    #[test]
    fn test_evaluate_concrete_trader() {
        let evaluation = engine().evaluate(
            &trader_a_book(),
            &scenario(),
            &FirmFinancials::unknown(),
        );
        let a = evaluation.trader(&"A".into()).unwrap();

        let dv01: Vec<f64> = a.positions.iter().map(|p| p.dv01).collect();
        assert_eq!(dv01, vec![2500.0, -1000.0]);
        assert_relative_eq!(a.positions[0].pct_of_total.unwrap(), 71.4286, epsilon = 1e-4);
        assert_relative_eq!(a.positions[1].pct_of_total.unwrap(), 28.5714, epsilon = 1e-4);
        assert!(a.positions[0].breach);
        assert!(!a.positions[1].breach);

        let stress: Vec<f64> = a.positions.iter().map(|p| p.stress_pnl).collect();
        assert_eq!(stress, vec![25000.0, 5000.0]);

        assert_eq!(a.summary.total_dv01, 1500.0);
        assert_eq!(a.summary.pnl_for_shock(5), Some(7500.0));
        assert_eq!(a.summary.pnl_for_shock(10), Some(15000.0));
        assert_eq!(a.summary.scenario_pnl, 30000.0);
        assert_eq!(a.breaches().count(), 1);
    }

    #[test]
    fn test_margin_ratio() {
        let financials = FirmFinancials::new(Some(100_000.0), None).unwrap();
        let evaluation = engine().evaluate(&trader_a_book(), &scenario(), &financials);

        let margin = evaluation.firm.margin_ratios.as_ref().unwrap();
        assert_relative_eq!(margin.ratio_for_shock(5).unwrap(), 0.075);
        assert_relative_eq!(margin.ratio_for_shock(10).unwrap(), 0.15);
        assert_relative_eq!(margin.scenario, 0.3);
        assert!(evaluation.firm.capital_ratios.is_none());
    }

    #[test]
    fn test_zero_exposure_trader() {
        let book = PositionBook::from_positions(vec![
            Position::new("Z", "2Y", 0),
            Position::new("Z", "5Y", 0),
        ]);
        let evaluation = engine().evaluate(&book, &scenario(), &FirmFinancials::unknown());
        let z = evaluation.trader(&"Z".into()).unwrap();

        assert!(z.positions.iter().all(|p| p.pct_of_total.is_none()));
        assert!(!z.has_breach());
        assert_eq!(z.summary.total_dv01, 0.0);
        assert_eq!(z.summary.pnl_for_shock(10), Some(0.0));
        assert_eq!(z.summary.scenario_pnl, 0.0);
    }

    #[test]
    fn test_empty_trader_is_reported() {
        let mut book = trader_a_book();
        book.register_trader("Idle");
        let evaluation = engine().evaluate(&book, &scenario(), &FirmFinancials::unknown());

        let idle = evaluation.trader(&"Idle".into()).unwrap();
        assert!(idle.summary.is_empty());
        assert!(idle.positions.is_empty());
        assert_eq!(evaluation.firm.trader_count, 2);
        assert_eq!(evaluation.firm.total_dv01, 1500.0);
    }

    #[test]
    fn test_empty_book() {
        let evaluation = engine().evaluate(
            &PositionBook::new(),
            &ScenarioShift::new(),
            &FirmFinancials::unknown(),
        );
        assert!(evaluation.traders.is_empty());
        assert_eq!(evaluation.firm.trader_count, 0);
        assert_eq!(evaluation.firm.pnl_for_shock(5), Some(0.0));
    }

    #[test]
    fn test_firm_total_equals_sum_of_traders() {
        let book = PositionBook::from_positions(vec![
            Position::new("A", "2Y", 100),
            Position::new("A", "10Y", -40),
            Position::new("B", "5Y", -60),
            Position::new("C", "30Y", 7),
        ]);
        let evaluation = engine().evaluate(&book, &scenario(), &FirmFinancials::unknown());

        let summed: f64 = evaluation.traders.iter().map(|t| t.summary.total_dv01).sum();
        assert_eq!(evaluation.firm.total_dv01, summed);
        let scenario_sum: f64 = evaluation
            .traders
            .iter()
            .map(|t| t.summary.scenario_pnl)
            .sum();
        assert_eq!(evaluation.firm.scenario_pnl, scenario_sum);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let engine = engine();
        let book = trader_a_book();
        let financials = FirmFinancials::new(Some(100_000.0), Some(1_000_000.0)).unwrap();
        let first = engine.evaluate(&book, &scenario(), &financials);
        let second = engine.evaluate(&book, &scenario(), &financials);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let positions: Vec<Position> = (0..40)
            .flat_map(|i| {
                let trader = format!("T{:02}", i);
                vec![
                    Position::new(trader.as_str(), "2Y", i * 3 - 50),
                    Position::new(trader.as_str(), "10Y", 17 - i),
                ]
            })
            .collect();
        let book = PositionBook::from_positions(positions);

        let parallel = engine()
            .with_parallel_config(ParallelConfig::new(1))
            .evaluate(&book, &scenario(), &FirmFinancials::unknown());
        let sequential = engine()
            .with_parallel_config(ParallelConfig::sequential())
            .evaluate(&book, &scenario(), &FirmFinancials::unknown());
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_evaluate_records_excludes_invalid_rows() {
        let records = vec![
            PositionRecord::new("A", "2Y", "100"),
            PositionRecord::new("A", "5Y", "1.5"),
            PositionRecord::new("A", "10Y", "-40"),
        ];
        let evaluation =
            engine().evaluate_records(records, &scenario(), &FirmFinancials::unknown());

        assert_eq!(evaluation.rejected.len(), 1);
        assert_eq!(evaluation.rejected[0].error, InputError::FractionalContracts(1.5));
        assert_eq!(evaluation.firm.total_dv01, 1500.0);
    }

    #[test]
    fn test_custom_shocks_and_tick() {
        let config = RiskConfig::default()
            .with_tick_value(10.0)
            .with_fixed_shocks(vec![1, 25]);
        let evaluation = RiskEngine::new(config).unwrap().evaluate(
            &trader_a_book(),
            &ScenarioShift::new(),
            &FirmFinancials::unknown(),
        );
        assert_eq!(evaluation.firm.total_dv01, 600.0);
        assert_eq!(evaluation.firm.pnl_for_shock(25), Some(15000.0));
        assert_eq!(evaluation.firm.pnl_for_shock(5), None);
        assert_eq!(evaluation.firm.scenario_pnl, 0.0);
    }
}
