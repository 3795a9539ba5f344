//! Domain types for MarketLens

pub mod bar;
pub mod series;

pub use bar::Bar;
pub use series::OhlcvSeries;
