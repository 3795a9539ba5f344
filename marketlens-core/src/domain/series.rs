//! Time-ordered OHLCV series for one symbol.

use super::bar::Bar;
use serde::{Deserialize, Serialize};

/// Ascending-by-date OHLCV history for a single symbol.
///
/// Construct through [`crate::data::canonicalize`], which enforces ordering,
/// uniqueness of dates and finiteness of every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl OhlcvSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes in date order.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}
