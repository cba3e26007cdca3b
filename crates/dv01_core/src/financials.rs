//! Firm-level financial reference amounts.

use crate::error::InputError;
use serde::Serialize;

/// Margin used and capital of the firm.
///
/// Either amount may be unknown. Values are validated once, on
/// construction; a `FirmFinancials` never holds NaN or infinity.
///
/// # Examples
///
/// ```
/// use dv01_core::FirmFinancials;
///
/// let financials = FirmFinancials::new(Some(100_000.0), None).unwrap();
/// assert_eq!(financials.margin_used(), Some(100_000.0));
/// assert_eq!(financials.capital(), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FirmFinancials {
    margin_used: Option<f64>,
    capital: Option<f64>,
}

impl FirmFinancials {
    /// Creates validated financials.
    pub fn new(margin_used: Option<f64>, capital: Option<f64>) -> Result<Self, InputError> {
        Ok(Self {
            margin_used: margin_used
                .map(|v| validate_amount("margin_used", v))
                .transpose()?,
            capital: capital.map(|v| validate_amount("capital", v)).transpose()?,
        })
    }

    /// Financials with both amounts unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Builds financials from column observations, taking the first
    /// present value of each column.
    ///
    /// Every observed value is validated, not only the first, so a corrupt
    /// cell further down a column is still reported.
    pub fn from_first_observed<M, C>(margins: M, capitals: C) -> Result<Self, InputError>
    where
        M: IntoIterator<Item = Option<f64>>,
        C: IntoIterator<Item = Option<f64>>,
    {
        let margin_used = first_valid("margin_used", margins)?;
        let capital = first_valid("capital", capitals)?;
        Ok(Self {
            margin_used,
            capital,
        })
    }

    /// Replaces the margin used.
    pub fn with_margin_used(self, margin_used: Option<f64>) -> Result<Self, InputError> {
        Self::new(margin_used, self.capital)
    }

    /// Replaces the capital.
    pub fn with_capital(self, capital: Option<f64>) -> Result<Self, InputError> {
        Self::new(self.margin_used, capital)
    }

    /// Margin used, if known.
    #[inline]
    pub fn margin_used(&self) -> Option<f64> {
        self.margin_used
    }

    /// Capital, if known.
    #[inline]
    pub fn capital(&self) -> Option<f64> {
        self.capital
    }
}

fn validate_amount(field: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::InvalidAmount { field, value })
    }
}

fn first_valid<I>(field: &'static str, values: I) -> Result<Option<f64>, InputError>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut first = None;
    for value in values.into_iter().flatten() {
        let value = validate_amount(field, value)?;
        first.get_or_insert(value);
    }
    Ok(first)
}

/// Parses a monetary amount as exported by spreadsheets ("1,500,000.00").
pub fn parse_amount(field: &'static str, raw: &str) -> Result<Option<f64>, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != '_').collect();
    let value: f64 = cleaned.parse().map_err(|_| InputError::NonNumericAmount {
        field,
        value: trimmed.to_string(),
    })?;
    validate_amount(field, value).map(Some)
}
