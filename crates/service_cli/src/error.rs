//! CLI error type.

use dv01_core::{ConfigError, InputError};
use thiserror::Error;

/// Errors surfaced by the `dv01` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid configuration, fatal before any evaluation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid firm-level input such as a corrupt margin or capital cell.
    #[error("Input error in {source_name}: {error}")]
    Input {
        /// File and row of the offending value.
        source_name: String,
        /// Underlying validation failure.
        error: InputError,
    },

    /// A named input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// CSV reading failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON rendering failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command-line argument has an invalid value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
