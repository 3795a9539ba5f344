//! Failover data collection across an ordered list of vendors.
//!
//! Policy:
//! 1. Try each provider in order
//! 2. Any failure (missing key, transport, bad payload, empty result) → log and try the next
//! 3. Every provider failed → one aggregated error naming the symbol
//!
//! No retries, no backoff: a provider gets exactly one attempt per request.

use super::provider::{DataError, DataProvider, FetchResult};
use thiserror::Error;

/// Errors from the collection layer.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to fetch market data for {symbol} from all providers")]
    AllVendorsExhausted {
        symbol: String,
        /// `(provider name, error)` for every attempt, in order.
        failures: Vec<(String, DataError)>,
    },
}

/// Ordered chain of data providers with failover.
#[derive(Default)]
pub struct DataCollector {
    providers: Vec<Box<dyn DataProvider>>,
}

impl DataCollector {
    pub fn new(providers: Vec<Box<dyn DataProvider>>) -> Self {
        Self { providers }
    }

    /// Append a provider at the lowest priority.
    pub fn with_provider(mut self, provider: Box<dyn DataProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Fetch `symbol` from the first provider that succeeds.
    pub fn fetch(&self, symbol: &str) -> Result<FetchResult, CollectError> {
        let mut failures = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            tracing::info!(symbol, provider = provider.name(), "fetching market data");
            match provider.fetch(symbol) {
                Ok(result) => {
                    tracing::info!(
                        symbol,
                        provider = provider.name(),
                        bars = result.series.len(),
                        "market data fetched"
                    );
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(
                        symbol,
                        provider = provider.name(),
                        error = %e,
                        "provider failed, trying next"
                    );
                    failures.push((provider.name().to_string(), e));
                }
            }
        }

        tracing::error!(symbol, attempts = failures.len(), "all providers failed");
        Err(CollectError::AllVendorsExhausted {
            symbol: symbol.to_string(),
            failures,
        })
    }
}
