//! Synthetic data provider for development.
//!
//! Produces a deterministic random walk seeded from the symbol name. This is a
//! developer-only mode: it is never configured by default and every fetch is
//! logged at warn level so synthetic results cannot be mistaken for real ones.

use super::canonicalize::canonicalize;
use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SyntheticProvider {
    end: NaiveDate,
    bar_count: usize,
}

impl SyntheticProvider {
    /// `bar_count` weekday bars ending on or before `end`.
    pub fn new(end: NaiveDate, bar_count: usize) -> Self {
        Self { end, bar_count }
    }

    /// Generate the walk. Same symbol and parameters always give the same bars.
    pub fn generate(&self, symbol: &str) -> Vec<Bar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut dates = Vec::with_capacity(self.bar_count);
        let mut current = self.end;
        while dates.len() < self.bar_count {
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                dates.push(current);
            }
            current -= chrono::Duration::days(1);
        }
        dates.reverse();

        let mut price = 100.0_f64;
        dates
            .into_iter()
            .map(|date| {
                let daily_return: f64 = rng.gen_range(-0.03..0.03);
                let open = price;
                let close = price * (1.0 + daily_return);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
                let volume = rng.gen_range(500_000..5_000_000u64) as f64;
                price = close;
                Bar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume,
                }
            })
            .collect()
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        tracing::warn!(symbol, "generating synthetic data; results are not market data");
        Ok(FetchResult {
            series: canonicalize(symbol, self.generate(symbol))?,
            source: DataSource::Synthetic,
        })
    }
}
