//! Error types for ingestion and configuration.
//!
//! Two families with different blast radius:
//! - [`InputError`] rejects a single record (or a single financial amount)
//!   and never aborts an evaluation pass.
//! - [`ConfigError`] is fatal: no pass starts with an invalid configuration.

use thiserror::Error;

/// Errors raised while validating a single input record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// A required field is absent or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The contract count could not be parsed as a number.
    #[error("Non-numeric contract count: {0:?}")]
    NonNumericContracts(String),

    /// The contract count is numeric but not a whole number.
    #[error("Contract count must be a whole number, got {0}")]
    FractionalContracts(f64),

    /// The contract count cannot be represented exactly.
    #[error("Contract count out of range: {0}")]
    ContractsOutOfRange(String),

    /// A monetary amount could not be parsed.
    #[error("Non-numeric {field} amount: {value:?}")]
    NonNumericAmount {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value as received.
        value: String,
    },

    /// A monetary amount is NaN or infinite.
    #[error("Invalid {field} amount: {value}")]
    InvalidAmount {
        /// Name of the offending field.
        field: &'static str,
        /// Value as received.
        value: f64,
    },

    /// The row is not valid UTF-8; holds its lossily decoded text.
    #[error("Row is not valid UTF-8: {0:?}")]
    InvalidEncoding(String),
}

/// Errors in the evaluation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Tick value missing, non-finite or not strictly positive.
    #[error("Invalid tick value: {0}. Must be a positive, finite amount")]
    InvalidTickValue(f64),

    /// DV01 limit percentage missing, non-finite or not strictly positive.
    #[error("Invalid DV01 limit percentage: {0}. Must be a positive, finite percentage")]
    InvalidLimitPct(f64),

    /// The same fixed shock size is configured twice.
    #[error("Duplicate fixed shock: {0}bp")]
    DuplicateShock(i32),

    /// A scenario shift assignment could not be parsed.
    #[error("Invalid scenario shift: {0}")]
    InvalidShift(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    FileError(String),

    /// Environment variable could not be parsed.
    #[error("Environment variable error: {0}")]
    EnvError(String),
}
