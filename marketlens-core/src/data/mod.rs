//! Market data acquisition: vendor adapters, canonicalisation, failover.

pub mod alpha_vantage;
pub mod canonicalize;
pub mod collector;
pub mod csv_import;
pub mod marketstack;
pub mod provider;
pub mod synthetic;

pub use alpha_vantage::AlphaVantageProvider;
pub use canonicalize::canonicalize;
pub use collector::{CollectError, DataCollector};
pub use csv_import::CsvProvider;
pub use marketstack::MarketStackProvider;
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::SyntheticProvider;
