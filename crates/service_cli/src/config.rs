//! Layered configuration for the CLI.
//!
//! Priority: command-line flags > environment > config file > defaults.
//! The merged [`RiskConfig`] is validated before it is handed to the engine.

use dv01_core::{RiskConfig, ScenarioShift};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{CliError, Result};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dv01.toml";

/// Log filter used when neither `RUST_LOG` nor the config file sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the config file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileSettings {
    /// Risk parameters, defaults filled in, not yet validated.
    pub risk: RiskConfig,
    /// Optional `log_level` key.
    pub log_level: Option<String>,
}

#[derive(Deserialize, Default)]
struct LoggingKeys {
    #[serde(default)]
    log_level: Option<String>,
}

impl FileSettings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let risk = RiskConfig::from_toml_str(content)?;
        let logging: LoggingKeys = toml::from_str(content).map_err(|e| {
            CliError::InvalidArgument(format!("Failed to parse log_level: {}", e))
        })?;
        Ok(Self {
            risk,
            log_level: logging.log_level,
        })
    }

    /// Loads settings from an explicit path, the default file, or nothing.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(CliError::FileNotFound(path.display().to_string()));
            }
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }
}

/// Risk parameters given on the command line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CliOverrides {
    /// `--tick-value`
    pub tick_value: Option<f64>,
    /// `--limit-pct`
    pub limit_pct: Option<f64>,
    /// `--shock`, repeated
    pub fixed_shocks_bp: Vec<i32>,
}

impl CliOverrides {
    /// Applies the overrides on top of `config`.
    pub fn apply(&self, mut config: RiskConfig) -> RiskConfig {
        if let Some(tick_value) = self.tick_value {
            config.tick_value = tick_value;
        }
        if let Some(limit_pct) = self.limit_pct {
            config.dv01_limit_pct = limit_pct;
        }
        if !self.fixed_shocks_bp.is_empty() {
            config.fixed_shocks_bp = self.fixed_shocks_bp.clone();
        }
        config
    }
}

/// Merges file, environment and flags into a validated configuration.
pub fn build_config(file: RiskConfig, overrides: &CliOverrides) -> Result<RiskConfig> {
    resolve_config(file, overrides, |key| std::env::var(key).ok())
}

fn resolve_config<F>(file: RiskConfig, overrides: &CliOverrides, env: F) -> Result<RiskConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = overrides.apply(file.with_overrides_from(env)?);
    config.validate()?;
    Ok(config)
}

/// Builds the scenario from an optional TOML file plus `TENOR=BP` flags.
///
/// Flags are applied last and replace file entries for the same tenor.
pub fn build_scenario(file: Option<&Path>, assignments: &[String]) -> Result<ScenarioShift> {
    let mut scenario = match file {
        Some(path) if !path.exists() => {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        Some(path) => ScenarioShift::from_file(path)?,
        None => ScenarioShift::new(),
    };
    for assignment in assignments {
        scenario.apply_assignment(assignment)?;
    }
    Ok(scenario)
}
