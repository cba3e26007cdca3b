//! # dv01_risk: DV01 Exposure and Limit Engine
//!
//! ## Risk Layer Role
//!
//! dv01_risk turns a `PositionBook` from dv01_core into per-position,
//! per-trader and firm-wide risk figures:
//! - DV01, exposure share and breach detection (`exposure`)
//! - Fixed-shock and scenario P&L projection (`pnl`)
//! - Trader and firm roll-ups with margin and capital ratios (`aggregator`)
//! - The end-to-end evaluation pass (`engine`)
//! - Rayon fan-out across traders (`parallel`)
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize` on every result type, for JSON reports
//!
//! ## Usage Examples
//!
//! ```rust
//! use dv01_core::{FirmFinancials, PositionRecord, RiskConfig, ScenarioShift};
//! use dv01_risk::RiskEngine;
//!
//! let engine = RiskEngine::new(RiskConfig::default()).unwrap();
//! let scenario = ScenarioShift::new().with_shift("2Y", 10).with_shift("10Y", -5);
//! let financials = FirmFinancials::new(Some(100_000.0), None).unwrap();
//!
//! let evaluation = engine.evaluate_records(
//!     vec![
//!         PositionRecord::new("A", "2Y", "100"),
//!         PositionRecord::new("A", "10Y", "-40"),
//!     ],
//!     &scenario,
//!     &financials,
//! );
//!
//! assert!(evaluation.has_breaches());
//! assert_eq!(evaluation.firm.scenario_pnl, 30000.0);
//! let margin = evaluation.firm.margin_ratios.as_ref().unwrap();
//! assert!((margin.ratio_for_shock(5).unwrap() - 0.075).abs() < 1e-12);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod aggregator;
pub mod engine;
pub mod enriched;
pub mod exposure;
pub mod parallel;
pub mod pnl;

pub use aggregator::{
    FirmAggregator, FirmSummary, RatioSet, ShockRatio, TraderAggregator, TraderSummary,
};
pub use engine::{Evaluation, RiskEngine, TraderEvaluation};
pub use enriched::EnrichedPosition;
pub use exposure::{compute_dv01, BreachDetector, ExposureNormalizer, ExposureShare};
pub use parallel::ParallelConfig;
pub use pnl::{PnlDirection, PnlProjector, ShockPnl};
