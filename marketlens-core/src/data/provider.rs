//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market data vendors (AlphaVantage,
//! MarketStack, CSV import, synthetic) so the collector can fail over between
//! them and tests can substitute stubs.

use crate::domain::OhlcvSeries;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Structured error types for a single vendor fetch.
///
/// Every variant triggers failover to the next vendor in the collector.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing credential: no API key configured for {vendor}")]
    MissingCredential { vendor: String },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {vendor}")]
    HttpStatus { vendor: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("{vendor} error: {message}")]
    VendorMessage { vendor: String, message: String },

    #[error("non-numeric value in field '{field}' for {date}")]
    NonNumeric { field: String, date: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data returned for symbol {symbol}")]
    EmptyResult { symbol: String },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: OhlcvSeries,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    AlphaVantage,
    MarketStack,
    CsvImport,
    Synthetic,
}

/// Trait for market data vendors.
///
/// Implementations normalise vendor field names into [`crate::domain::Bar`]
/// and return a canonical (ascending, de-duplicated) series.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the full daily OHLCV history the vendor offers for `symbol`.
    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError>;
}

/// Build the blocking HTTP client shared by the HTTP vendors.
///
/// Vendor calls rely on this transport-level timeout; there is no retry.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, DataError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("marketlens/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DataError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))
}

/// Map a transport or body-decoding failure into a [`DataError`].
///
/// The request URL carries the vendor credential, so it is stripped before
/// the message reaches logs or the failure envelope.
pub(crate) fn transport_error(e: reqwest::Error) -> DataError {
    let e = e.without_url();
    if e.is_decode() {
        DataError::ResponseFormatChanged(e.to_string())
    } else {
        DataError::NetworkUnreachable(e.to_string())
    }
}

/// Parse a vendor-supplied string field as `f64`.
///
/// A missing or non-numeric field is a hard failure for the whole response.
pub(crate) fn parse_numeric(field: &str, date: &str, raw: Option<&str>) -> Result<f64, DataError> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::NonNumeric {
            field: field.to_string(),
            date: date.to_string(),
        })
}
