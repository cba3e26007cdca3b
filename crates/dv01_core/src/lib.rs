//! # dv01_core: Foundation Types for the DV01 Risk Monitor
//!
//! ## Foundation Role
//!
//! dv01_core is the bottom layer of the workspace. It holds the typed inputs
//! of one evaluation pass and nothing that computes risk:
//! - Identifiers: `TraderId`, `Tenor` (`ids`)
//! - Positions: raw `PositionRecord` rows and validated `Position`s (`position`)
//! - Position store: `PositionBook` grouping positions per trader (`book`)
//! - Scenario shifts: per-tenor basis-point shifts (`scenario`)
//! - Firm financials: optional margin and capital (`financials`)
//! - Configuration: tick value, limit percentage, fixed shocks (`config`)
//! - Error types: `InputError`, `ConfigError` (`error`)
//!
//! ## Usage Examples
//!
//! ```rust
//! use dv01_core::{PositionBook, PositionRecord, RiskConfig, ScenarioShift};
//!
//! let records = vec![
//!     PositionRecord::new("A", "2Y", "100"),
//!     PositionRecord::new("A", "10Y", "-40"),
//!     PositionRecord::new("A", "5Y", "abc"),
//! ];
//! let (book, rejected) = PositionBook::from_records(records);
//! assert_eq!(book.position_count(), 2);
//! assert_eq!(rejected.len(), 1);
//!
//! let scenario = ScenarioShift::new().with_shift("2Y", 10).with_shift("10Y", -5);
//! assert_eq!(scenario.shift_for(&"30Y".into()), 0);
//!
//! let config = RiskConfig::default();
//! assert!(config.validate().is_ok());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod book;
pub mod config;
pub mod error;
pub mod financials;
pub mod ids;
pub mod position;
pub mod scenario;

pub use book::{PositionBook, RejectedRecord};
pub use config::{
    RiskConfig, DEFAULT_DV01_LIMIT_PCT, DEFAULT_FIXED_SHOCKS_BP, DEFAULT_TICK_VALUE,
};
pub use error::{ConfigError, InputError};
pub use financials::FirmFinancials;
pub use ids::{Tenor, TraderId};
pub use position::{Position, PositionRecord};
pub use scenario::ScenarioShift;
