//! MarketLens Core: market data, features, alpha rules, risk sizing.
//!
//! This crate holds every deterministic stage of the inference pipeline:
//! - Domain types (bars, OHLCV series)
//! - Data vendors and the failover `DataCollector`
//! - Technical indicators and the `FeatureBuilder`
//! - Rule-based alpha signals and their ensemble
//! - Confidence-scaled position sizing

pub mod alpha;
pub mod data;
pub mod domain;
pub mod features;
pub mod indicators;
pub mod risk;
