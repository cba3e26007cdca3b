//! Per-tenor scenario shifts.
//!
//! A [`ScenarioShift`] maps tenor labels to flat, signed basis-point moves.
//! Tenors absent from the mapping move by zero.

use crate::error::ConfigError;
use crate::ids::Tenor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Trader-supplied yield shift per tenor bucket, in basis points.
///
/// # Examples
///
/// ```
/// use dv01_core::ScenarioShift;
///
/// let scenario = ScenarioShift::new().with_shift("2Y", 10).with_shift("10Y", -5);
/// assert_eq!(scenario.shift_for(&"2Y".into()), 10);
/// assert_eq!(scenario.shift_for(&"5Y".into()), 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioShift {
    shifts: BTreeMap<Tenor, i32>,
}

#[derive(Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    shifts: BTreeMap<Tenor, i32>,
}

impl ScenarioShift {
    /// Creates an empty scenario (every tenor unshifted).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the shift for a tenor.
    pub fn with_shift(mut self, tenor: impl Into<Tenor>, shift_bp: i32) -> Self {
        self.insert(tenor, shift_bp);
        self
    }

    /// Sets the shift for a tenor, returning the previous value if any.
    pub fn insert(&mut self, tenor: impl Into<Tenor>, shift_bp: i32) -> Option<i32> {
        self.shifts.insert(tenor.into(), shift_bp)
    }

    /// Returns the shift for a tenor, zero when the tenor is not mapped.
    #[inline]
    pub fn shift_for(&self, tenor: &Tenor) -> i32 {
        self.shifts.get(tenor).copied().unwrap_or(0)
    }

    /// Returns whether the tenor has an explicit shift.
    pub fn contains(&self, tenor: &Tenor) -> bool {
        self.shifts.contains_key(tenor)
    }

    /// Iterates over explicit shifts in tenor label order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tenor, i32)> {
        self.shifts.iter().map(|(t, s)| (t, *s))
    }

    /// Number of explicitly shifted tenors.
    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    /// Returns true when no tenor is shifted.
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Applies a `TENOR=BP` assignment such as `"10Y=-5"`.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (tenor, bp) = assignment.split_once('=').ok_or_else(|| {
            ConfigError::InvalidShift(format!("expected TENOR=BP, got {:?}", assignment))
        })?;
        let tenor = tenor.trim();
        if tenor.is_empty() {
            return Err(ConfigError::InvalidShift(format!(
                "missing tenor in {:?}",
                assignment
            )));
        }
        let bp: i32 = bp.trim().parse().map_err(|_| {
            ConfigError::InvalidShift(format!("non-integer shift in {:?}", assignment))
        })?;
        self.insert(tenor, bp);
        Ok(())
    }

    /// Parses a scenario from TOML with a `[shifts]` table.
    ///
    /// ```toml
    /// [shifts]
    /// "2Y" = 10
    /// "10Y" = -5
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ScenarioFile = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse scenario TOML: {}", e)))?;
        Ok(Self {
            shifts: file.shifts,
        })
    }

    /// Loads a scenario from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!(
                "Failed to read scenario file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }
}

impl<T: Into<Tenor>> FromIterator<(T, i32)> for ScenarioShift {
    fn from_iter<I: IntoIterator<Item = (T, i32)>>(iter: I) -> Self {
        Self {
            shifts: iter.into_iter().map(|(t, s)| (t.into(), s)).collect(),
        }
    }
}
