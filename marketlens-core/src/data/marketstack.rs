//! MarketStack end-of-day provider (secondary vendor).
//!
//! `/v1/eod` returns `{"data": [{date, open, high, low, close, volume, ...}]}`,
//! newest first. Dates carry a time and offset (`2024-01-02T00:00:00+0000`);
//! only the calendar date is kept.

use super::canonicalize::canonicalize;
use super::provider::{
    http_client, transport_error, DataError, DataProvider, DataSource, FetchResult,
};
use crate::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const VENDOR: &str = "marketstack";
const DEFAULT_BASE_URL: &str = "http://api.marketstack.com/v1/eod";
const DEFAULT_EXCHANGE_SUFFIX: &str = "XNSE";
const PAGE_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
struct EodResponse {
    data: Option<Vec<EodEntry>>,
    error: Option<EodError>,
}

#[derive(Debug, Deserialize)]
struct EodError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EodEntry {
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

pub struct MarketStackProvider {
    client: reqwest::blocking::Client,
    access_key: Option<String>,
    base_url: String,
    exchange_suffix: String,
}

impl MarketStackProvider {
    pub fn new(access_key: Option<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: http_client(Duration::from_secs(30))?,
            access_key: access_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            exchange_suffix: DEFAULT_EXCHANGE_SUFFIX.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, symbol: &str, access_key: &str) -> reqwest::blocking::RequestBuilder {
        self.client.get(&self.base_url).query(&[
            ("access_key", access_key.to_string()),
            ("symbols", format!("{symbol}.{}", self.exchange_suffix)),
            ("limit", PAGE_LIMIT.to_string()),
        ])
    }

    fn parse_response(symbol: &str, resp: EodResponse) -> Result<Vec<Bar>, DataError> {
        let entries = match resp.data {
            Some(entries) => entries,
            None => {
                let message = resp
                    .error
                    .map(|e| {
                        format!(
                            "{}: {}",
                            e.code.unwrap_or_else(|| "error".into()),
                            e.message.unwrap_or_default()
                        )
                    })
                    .unwrap_or_else(|| "no data field in response".into());
                return Err(DataError::VendorMessage {
                    vendor: VENDOR.to_string(),
                    message,
                });
            }
        };

        if entries.is_empty() {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }

        entries
            .into_iter()
            .map(|entry| -> Result<Bar, DataError> {
                let day = entry.date.get(..10).unwrap_or(&entry.date);
                let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                    DataError::ResponseFormatChanged(format!("invalid date '{}': {e}", entry.date))
                })?;
                let field = |name: &str, value: Option<f64>| {
                    value.filter(|v| v.is_finite()).ok_or_else(|| DataError::NonNumeric {
                        field: name.to_string(),
                        date: day.to_string(),
                    })
                };
                Ok(Bar {
                    date,
                    open: field("open", entry.open)?,
                    high: field("high", entry.high)?,
                    low: field("low", entry.low)?,
                    close: field("close", entry.close)?,
                    volume: field("volume", entry.volume)?,
                })
            })
            .collect()
    }

    /// Decode a raw JSON body. Exposed for fixture tests.
    pub fn parse_body(symbol: &str, body: &str) -> Result<Vec<Bar>, DataError> {
        let resp: EodResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        Self::parse_response(symbol, resp)
    }
}

impl DataProvider for MarketStackProvider {
    fn name(&self) -> &str {
        VENDOR
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        let access_key = self
            .access_key
            .as_deref()
            .ok_or_else(|| DataError::MissingCredential {
                vendor: VENDOR.to_string(),
            })?;

        let resp = self
            .request(symbol, access_key)
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                vendor: VENDOR.to_string(),
                status: status.as_u16(),
            });
        }

        let body: EodResponse = resp.json().map_err(transport_error)?;

        let bars = Self::parse_response(symbol, body)?;
        Ok(FetchResult {
            series: canonicalize(symbol, bars)?,
            source: DataSource::MarketStack,
        })
    }
}
