//! Identifier types for traders and tenor buckets.
//!
//! Newtypes keep a trader name from being passed where a tenor label is
//! expected. Neither type imposes a vocabulary or an ordering on its
//! contents: "2Y", "10Y" and "Dec-26" are all valid tenor labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a trader (one position sheet per trader).
///
/// # Examples
///
/// ```
/// use dv01_core::TraderId;
///
/// let id = TraderId::new("Alice");
/// assert_eq!(id.as_str(), "Alice");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraderId(String);

impl TraderId {
    /// Creates a new trader ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TraderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TraderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Maturity bucket label of a position, e.g. "2Y" or "10Y".
///
/// # Examples
///
/// ```
/// use dv01_core::Tenor;
///
/// let tenor: Tenor = "10Y".into();
/// assert_eq!(tenor.as_str(), "10Y");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tenor(String);

impl Tenor {
    /// Creates a new tenor label.
    #[inline]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Tenor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Tenor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_trader_id_from_str_and_string() {
        let a: TraderId = "Alice".into();
        let b: TraderId = String::from("Alice").into();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Alice");
    }

    #[test]
    fn test_trader_id_display() {
        assert_eq!(format!("{}", TraderId::new("Bob")), "Bob");
    }

    #[test]
    fn test_tenor_labels_are_case_sensitive() {
        assert_ne!(Tenor::new("2Y"), Tenor::new("2y"));
    }

    #[test]
    fn test_tenor_hash() {
        let mut set = HashSet::new();
        set.insert(Tenor::new("2Y"));
        set.insert(Tenor::new("10Y"));
        set.insert(Tenor::new("2Y")); // Duplicate
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serde_transparent() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            trader: TraderId,
            tenor: Tenor,
        }

        let parsed: Wrapper = toml::from_str("trader = \"A\"\ntenor = \"5Y\"").unwrap();
        assert_eq!(parsed.trader.as_str(), "A");
        assert_eq!(parsed.tenor.as_str(), "5Y");
    }
}
