//! AlphaVantage daily-adjusted time series provider (primary vendor).
//!
//! `TIME_SERIES_DAILY_ADJUSTED` returns a map of date → string-valued OHLCV
//! fields. On quota exhaustion or a bad symbol the time-series key is absent
//! and a `Note` / `Error Message` / `Information` string is returned instead.

use super::canonicalize::canonicalize;
use super::provider::{
    http_client, parse_numeric, transport_error, DataError, DataProvider, DataSource,
    FetchResult,
};
use crate::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const VENDOR: &str = "alphavantage";
const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
const DEFAULT_EXCHANGE_SUFFIX: &str = "BSE";

#[derive(Debug, Deserialize)]
struct DailyAdjustedResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, DailyEntry>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    #[serde(rename = "1. open")]
    open: Option<String>,
    #[serde(rename = "2. high")]
    high: Option<String>,
    #[serde(rename = "3. low")]
    low: Option<String>,
    #[serde(rename = "4. close")]
    close: Option<String>,
    #[serde(rename = "6. volume")]
    volume: Option<String>,
}

/// AlphaVantage provider.
///
/// Constructed with an optional API key; without one every fetch fails
/// immediately with [`DataError::MissingCredential`] so the collector moves on.
pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    base_url: String,
    exchange_suffix: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: http_client(Duration::from_secs(30))?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            exchange_suffix: DEFAULT_EXCHANGE_SUFFIX.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, symbol: &str, api_key: &str) -> reqwest::blocking::RequestBuilder {
        let vendor_symbol = format!("{symbol}.{}", self.exchange_suffix);
        self.client.get(&self.base_url).query(&[
            ("function", "TIME_SERIES_DAILY_ADJUSTED"),
            ("symbol", vendor_symbol.as_str()),
            ("outputsize", "full"),
            ("apikey", api_key),
        ])
    }

    /// Parse a decoded response body into bars (unsorted).
    fn parse_response(symbol: &str, resp: DailyAdjustedResponse) -> Result<Vec<Bar>, DataError> {
        let series = match resp.time_series {
            Some(series) => series,
            None => {
                let message = resp
                    .note
                    .or(resp.error_message)
                    .or(resp.information)
                    .unwrap_or_else(|| "Unknown error fetching from AlphaVantage".to_string());
                return Err(DataError::VendorMessage {
                    vendor: VENDOR.to_string(),
                    message,
                });
            }
        };

        if series.is_empty() {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }

        series
            .into_iter()
            .map(|(date_str, entry)| -> Result<Bar, DataError> {
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    DataError::ResponseFormatChanged(format!("invalid date '{date_str}': {e}"))
                })?;
                Ok(Bar {
                    date,
                    open: parse_numeric("1. open", &date_str, entry.open.as_deref())?,
                    high: parse_numeric("2. high", &date_str, entry.high.as_deref())?,
                    low: parse_numeric("3. low", &date_str, entry.low.as_deref())?,
                    close: parse_numeric("4. close", &date_str, entry.close.as_deref())?,
                    volume: parse_numeric("6. volume", &date_str, entry.volume.as_deref())?,
                })
            })
            .collect()
    }

    /// Decode a raw JSON body. Exposed for fixture tests.
    pub fn parse_body(symbol: &str, body: &str) -> Result<Vec<Bar>, DataError> {
        let resp: DailyAdjustedResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        Self::parse_response(symbol, resp)
    }
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        VENDOR
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DataError::MissingCredential {
                vendor: VENDOR.to_string(),
            })?;

        let resp = self
            .request(symbol, api_key)
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                vendor: VENDOR.to_string(),
                status: status.as_u16(),
            });
        }

        let body: DailyAdjustedResponse = resp.json().map_err(transport_error)?;

        let bars = Self::parse_response(symbol, body)?;
        Ok(FetchResult {
            series: canonicalize(symbol, bars)?,
            source: DataSource::AlphaVantage,
        })
    }
}
