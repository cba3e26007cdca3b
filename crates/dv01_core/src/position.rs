//! Raw position rows and validated positions.
//!
//! A [`PositionRecord`] is what an ingestion layer hands over: every field
//! optional, the contract count still text. [`PositionRecord::validate`]
//! turns it into an immutable [`Position`] or a single [`InputError`];
//! nothing is ever coerced to zero.

use crate::error::InputError;
use crate::ids::{Tenor, TraderId};
use serde::{Deserialize, Serialize};

/// Largest contract count whose DV01 stays exact in `f64` arithmetic (2^53).
pub const MAX_ABS_CONTRACTS: i64 = 9_007_199_254_740_992;

/// A typed futures position held by one trader in one tenor bucket.
///
/// Negative `contracts` is a short position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    trader: TraderId,
    tenor: Tenor,
    contracts: i64,
}

impl Position {
    /// Creates a new position.
    pub fn new(trader: impl Into<TraderId>, tenor: impl Into<Tenor>, contracts: i64) -> Self {
        Self {
            trader: trader.into(),
            tenor: tenor.into(),
            contracts,
        }
    }

    /// Returns the owning trader.
    #[inline]
    pub fn trader(&self) -> &TraderId {
        &self.trader
    }

    /// Returns the tenor bucket label.
    #[inline]
    pub fn tenor(&self) -> &Tenor {
        &self.tenor
    }

    /// Returns the signed contract count.
    #[inline]
    pub fn contracts(&self) -> i64 {
        self.contracts
    }
}

/// A position row as received from an ingestion layer, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Trader name.
    #[serde(default)]
    pub trader: Option<String>,
    /// Tenor label.
    #[serde(default)]
    pub tenor: Option<String>,
    /// Contract count, as text.
    #[serde(default)]
    pub contracts: Option<String>,
}

impl PositionRecord {
    /// Creates a fully populated record.
    pub fn new(
        trader: impl Into<String>,
        tenor: impl Into<String>,
        contracts: impl Into<String>,
    ) -> Self {
        Self {
            trader: Some(trader.into()),
            tenor: Some(tenor.into()),
            contracts: Some(contracts.into()),
        }
    }

    /// Validates the record into a [`Position`].
    ///
    /// Fields are checked in the order trader, tenor, contracts; the first
    /// failure is reported.
    pub fn validate(&self) -> Result<Position, InputError> {
        let trader = required(self.trader.as_deref(), "trader")?;
        let tenor = required(self.tenor.as_deref(), "tenor")?;
        let contracts = required(self.contracts.as_deref(), "contracts")?;
        let contracts = parse_contracts(contracts)?;
        Ok(Position::new(trader, tenor, contracts))
    }
}

impl TryFrom<&PositionRecord> for Position {
    type Error = InputError;

    fn try_from(record: &PositionRecord) -> Result<Self, Self::Error> {
        record.validate()
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, InputError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(InputError::MissingField(field)),
    }
}

/// Parses a contract count.
///
/// Accepts plain integers, thousands separators ("1,000") and integral
/// floats as spreadsheets export them ("100.0").
pub fn parse_contracts(raw: &str) -> Result<i64, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingField("contracts"));
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != '_').collect();

    if let Ok(value) = cleaned.parse::<i64>() {
        if value.checked_abs().map_or(true, |v| v > MAX_ABS_CONTRACTS) {
            return Err(InputError::ContractsOutOfRange(trimmed.to_string()));
        }
        return Ok(value);
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| InputError::NonNumericContracts(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(InputError::NonNumericContracts(trimmed.to_string()));
    }
    if value.fract() != 0.0 {
        return Err(InputError::FractionalContracts(value));
    }
    if value.abs() > MAX_ABS_CONTRACTS as f64 {
        return Err(InputError::ContractsOutOfRange(trimmed.to_string()));
    }
    Ok(value as i64)
}
