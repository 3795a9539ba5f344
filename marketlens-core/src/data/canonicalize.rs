//! Canonicalisation shared by every vendor adapter: sort, dedupe, validate.

use super::provider::DataError;
use crate::domain::{Bar, OhlcvSeries};

/// Turn vendor bars into a canonical series.
///
/// - rejects an empty result
/// - rejects any bar with a non-finite field
/// - sorts ascending by date (stable)
/// - drops duplicate dates, keeping the first occurrence
pub fn canonicalize(symbol: &str, mut bars: Vec<Bar>) -> Result<OhlcvSeries, DataError> {
    if bars.is_empty() {
        return Err(DataError::EmptyResult {
            symbol: symbol.to_string(),
        });
    }

    if let Some(bad) = bars.iter().find(|b| !b.is_finite()) {
        return Err(DataError::ValidationError(format!(
            "non-finite OHLCV value for {symbol} on {}",
            bad.date
        )));
    }

    bars.sort_by_key(|b| b.date);
    let before = bars.len();
    bars.dedup_by_key(|b| b.date);
    let dropped = before - bars.len();
    if dropped > 0 {
        tracing::debug!(symbol, dropped, "dropped duplicate dates");
    }

    Ok(OhlcvSeries::new(symbol, bars))
}
