//! Ordered ticker sets.
//!
//! The position of a ticker inside a [`TickerSet`] is the index used by every
//! vector and matrix downstream (mean returns, covariance, weights).

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered, duplicate-free, non-empty list of asset identifiers.
///
/// Identifiers are trimmed and upper-cased on construction.
///
/// # Examples
///
/// ```
/// use tangent_data::TickerSet;
///
/// let tickers = TickerSet::new(["aapl", " msft "]).unwrap();
/// assert_eq!(tickers.as_slice(), &["AAPL".to_string(), "MSFT".to_string()]);
/// assert_eq!(tickers.index_of("MSFT"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TickerSet(Vec<String>);

impl TickerSet {
    /// Build a ticker set, normalizing each identifier.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidTickerSet`] for an empty list, a blank
    /// identifier, or a duplicate (after normalization).
    pub fn new<I, S>(tickers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();

        for raw in tickers {
            let symbol = raw.as_ref().trim().to_uppercase();
            if symbol.is_empty() {
                return Err(DataError::InvalidTickerSet(
                    "blank ticker identifier".to_string(),
                ));
            }
            if normalized.contains(&symbol) {
                return Err(DataError::InvalidTickerSet(format!(
                    "duplicate ticker {symbol}"
                )));
            }
            normalized.push(symbol);
        }

        if normalized.is_empty() {
            return Err(DataError::InvalidTickerSet(
                "at least one ticker is required".to_string(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Number of tickers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tickers in index order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate over tickers in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Position of `symbol` in the set.
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.0.iter().position(|s| s == symbol)
    }

    /// Whether `symbol` is part of the set.
    pub fn contains(&self, symbol: &str) -> bool {
        self.index_of(symbol).is_some()
    }
}

impl TryFrom<Vec<String>> for TickerSet {
    type Error = DataError;

    fn try_from(tickers: Vec<String>) -> Result<Self> {
        Self::new(tickers)
    }
}

impl From<TickerSet> for Vec<String> {
    fn from(tickers: TickerSet) -> Self {
        tickers.0
    }
}

impl<'a> IntoIterator for &'a TickerSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for TickerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}
