//! Evaluation configuration.
//!
//! Loaded from TOML, overridden by environment variables, validated before
//! any computation starts.

use crate::error::ConfigError;
use crate::position::MAX_ABS_CONTRACTS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default monetary value per contract per basis point.
pub const DEFAULT_TICK_VALUE: f64 = 25.0;

/// Default concentration limit, as a percentage of a trader's gross DV01.
pub const DEFAULT_DV01_LIMIT_PCT: f64 = 30.0;

/// Default fixed parallel shocks, in basis points.
pub const DEFAULT_FIXED_SHOCKS_BP: &[i32] = &[5, 10];

/// Environment variable overriding [`RiskConfig::tick_value`].
pub const ENV_TICK_VALUE: &str = "DV01_TICK_VALUE";
/// Environment variable overriding [`RiskConfig::dv01_limit_pct`].
pub const ENV_LIMIT_PCT: &str = "DV01_LIMIT_PCT";
/// Environment variable overriding [`RiskConfig::fixed_shocks_bp`] (comma-separated).
pub const ENV_FIXED_SHOCKS_BP: &str = "DV01_FIXED_SHOCKS_BP";

/// Parameters of one evaluation pass.
///
/// # Examples
///
/// ```
/// use dv01_core::RiskConfig;
///
/// let config = RiskConfig::default().with_limit_pct(25.0);
/// assert_eq!(config.tick_value, 25.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Monetary amount per contract per basis point.
    pub tick_value: f64,
    /// Breach threshold, percent of the trader's gross DV01.
    pub dv01_limit_pct: f64,
    /// Fixed parallel shocks to project, in basis points.
    pub fixed_shocks_bp: Vec<i32>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            tick_value: DEFAULT_TICK_VALUE,
            dv01_limit_pct: DEFAULT_DV01_LIMIT_PCT,
            fixed_shocks_bp: DEFAULT_FIXED_SHOCKS_BP.to_vec(),
        }
    }
}

impl RiskConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick value.
    pub fn with_tick_value(mut self, tick_value: f64) -> Self {
        self.tick_value = tick_value;
        self
    }

    /// Sets the DV01 limit percentage.
    pub fn with_limit_pct(mut self, limit_pct: f64) -> Self {
        self.dv01_limit_pct = limit_pct;
        self
    }

    /// Sets the fixed shocks.
    pub fn with_fixed_shocks(mut self, shocks_bp: Vec<i32>) -> Self {
        self.fixed_shocks_bp = shocks_bp;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_value.is_finite() && self.tick_value > 0.0) {
            return Err(ConfigError::InvalidTickValue(self.tick_value));
        }
        // Every accepted contract count must give a finite DV01.
        if !(self.tick_value * MAX_ABS_CONTRACTS as f64).is_finite() {
            return Err(ConfigError::InvalidTickValue(self.tick_value));
        }
        if !(self.dv01_limit_pct.is_finite() && self.dv01_limit_pct > 0.0) {
            return Err(ConfigError::InvalidLimitPct(self.dv01_limit_pct));
        }
        let mut seen = HashSet::with_capacity(self.fixed_shocks_bp.len());
        for &shock in &self.fixed_shocks_bp {
            if !seen.insert(shock) {
                return Err(ConfigError::DuplicateShock(shock));
            }
        }
        Ok(())
    }

    /// Parses a configuration from TOML. Missing keys take their defaults.
    ///
    /// The result is not validated; overrides may still be applied.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Loads a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TICK_VALUE) {
            self.tick_value = parse_env(ENV_TICK_VALUE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LIMIT_PCT) {
            self.dv01_limit_pct = parse_env(ENV_LIMIT_PCT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_FIXED_SHOCKS_BP) {
            let shocks: Vec<i32> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_env(ENV_FIXED_SHOCKS_BP, s))
                .collect::<Result<_, _>>()?;
            if shocks.is_empty() {
                return Err(ConfigError::EnvError(format!(
                    "{}={:?} lists no shocks",
                    ENV_FIXED_SHOCKS_BP, raw
                )));
            }
            self.fixed_shocks_bp = shocks;
        }
        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{}={:?} is not a valid value", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RiskConfig::default();
        assert_eq!(config.tick_value, 25.0);
        assert_eq!(config.dv01_limit_pct, 30.0);
        assert_eq!(config.fixed_shocks_bp, vec![5, 10]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_tick_value() {
        for bad in [0.0, -25.0, f64::NAN, f64::INFINITY, 1e300, f64::MAX] {
            let config = RiskConfig::default().with_tick_value(bad);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTickValue(_))
            ));
        }
    }

    #[test]
    fn test_validate_accepts_large_tick_value() {
        assert!(RiskConfig::default().with_tick_value(1e6).validate().is_ok());
    }

    #[test]
    fn test_validate_limit_pct() {
        for bad in [0.0, -1.0, f64::NAN] {
            let config = RiskConfig::default().with_limit_pct(bad);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidLimitPct(_))
            ));
        }
        assert!(RiskConfig::default().with_limit_pct(150.0).validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_shocks() {
        let config = RiskConfig::default().with_fixed_shocks(vec![5, 10, 5]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateShock(5))
        ));
        assert!(RiskConfig::default()
            .with_fixed_shocks(vec![])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let config = RiskConfig::from_toml_str(
            r#"
            tick_value = 24.5
            dv01_limit_pct = 40
            fixed_shocks_bp = [-10, 25]
            "#,
        )
        .unwrap();
        assert_eq!(config.tick_value, 24.5);
        assert_eq!(config.dv01_limit_pct, 40.0);
        assert_eq!(config.fixed_shocks_bp, vec![-10, 25]);
    }

    #[test]
    fn test_partial_toml_deserialization() {
        let config = RiskConfig::from_toml_str("dv01_limit_pct = 20.0").unwrap();
        assert_eq!(config.tick_value, DEFAULT_TICK_VALUE);
        assert_eq!(config.dv01_limit_pct, 20.0);
        assert_eq!(config.fixed_shocks_bp, DEFAULT_FIXED_SHOCKS_BP.to_vec());
    }

    #[test]
    fn test_invalid_toml() {
        let result = RiskConfig::from_toml_str("tick_value = \"lots\"");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dv01.toml");
        std::fs::write(&path, "tick_value = 10.0\n").unwrap();

        let config = RiskConfig::from_file(&path).unwrap();
        assert_eq!(config.tick_value, 10.0);

        let missing = RiskConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = RiskConfig::default()
            .with_overrides_from(lookup_from(&[
                (ENV_TICK_VALUE, "12.5"),
                (ENV_LIMIT_PCT, " 45 "),
                (ENV_FIXED_SHOCKS_BP, "1, 2,3,"),
            ]))
            .unwrap();
        assert_eq!(config.tick_value, 12.5);
        assert_eq!(config.dv01_limit_pct, 45.0);
        assert_eq!(config.fixed_shocks_bp, vec![1, 2, 3]);
    }

    #[test]
    fn test_overrides_absent_keep_values() {
        let config = RiskConfig::default()
            .with_limit_pct(20.0)
            .with_overrides_from(lookup_from(&[]))
            .unwrap();
        assert_eq!(config.dv01_limit_pct, 20.0);
    }

    #[test]
    fn test_overrides_parse_error() {
        let result =
            RiskConfig::default().with_overrides_from(lookup_from(&[(ENV_LIMIT_PCT, "thirty")]));
        assert!(matches!(result, Err(ConfigError::EnvError(_))));
    }

    #[test]
    fn test_overrides_blank_shocks_are_an_error() {
        for blank in ["", " ", " , "] {
            let result = RiskConfig::default()
                .with_overrides_from(lookup_from(&[(ENV_FIXED_SHOCKS_BP, blank)]));
            assert!(matches!(result, Err(ConfigError::EnvError(_))), "{:?}", blank);
        }
    }
}
