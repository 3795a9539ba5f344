//! Rule-based alpha signals and their ensemble.
//!
//! Each rule reads only the latest feature row and returns 0 or 1. The
//! ensemble is the unweighted mean of the three votes.

pub mod fundamental;

pub use fundamental::{fundamental_score, FundamentalSnapshot};

use crate::features::{FeatureFrame, FeatureRow};
use serde::{Deserialize, Serialize};

/// RSI below this reads as oversold for mean reversion.
pub const OVERSOLD_RSI: f64 = 30.0;

/// A single binary alpha rule.
pub trait AlphaRule: Send + Sync {
    fn name(&self) -> &str;

    /// 1 when the rule fires on `row`, otherwise 0.
    fn evaluate(&self, row: &FeatureRow) -> u8;
}

/// Uptrend regime with positive recent drift.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendFollowing;

impl AlphaRule for TrendFollowing {
    fn name(&self) -> &str {
        "trend_following"
    }

    fn evaluate(&self, row: &FeatureRow) -> u8 {
        u8::from(row.trend_regime == 1 && row.ret_mean_10 > 0.0)
    }
}

/// Oversold RSI outside an uptrend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversion;

impl AlphaRule for MeanReversion {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn evaluate(&self, row: &FeatureRow) -> u8 {
        u8::from(row.trend_regime == 0 && row.rsi < OVERSOLD_RSI)
    }
}

/// Volume-confirmed range breakout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Breakout;

impl AlphaRule for Breakout {
    fn name(&self) -> &str {
        "breakout"
    }

    fn evaluate(&self, row: &FeatureRow) -> u8 {
        u8::from(row.breakout == 1)
    }
}

/// Votes of the three rules on the latest row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlphaSignalSet {
    pub trend_following: u8,
    pub mean_reversion: u8,
    pub breakout: u8,
}

impl AlphaSignalSet {
    /// Unweighted mean of the votes, in [0, 1].
    pub fn probability(&self) -> f64 {
        let votes = [self.trend_following, self.mean_reversion, self.breakout];
        votes.iter().map(|&v| f64::from(v)).sum::<f64>() / votes.len() as f64
    }

    pub fn active(&self) -> usize {
        [self.trend_following, self.mean_reversion, self.breakout]
            .iter()
            .filter(|&&v| v == 1)
            .count()
    }
}

/// Evaluates the fixed rule set against a feature frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaEnsemble;

impl AlphaEnsemble {
    pub fn new() -> Self {
        Self
    }

    /// Votes on the latest row. An empty frame votes all zeros.
    pub fn evaluate(&self, frame: &FeatureFrame) -> AlphaSignalSet {
        match frame.latest() {
            Some(row) => self.evaluate_row(row),
            None => AlphaSignalSet::default(),
        }
    }

    pub fn evaluate_row(&self, row: &FeatureRow) -> AlphaSignalSet {
        let signals = AlphaSignalSet {
            trend_following: TrendFollowing.evaluate(row),
            mean_reversion: MeanReversion.evaluate(row),
            breakout: Breakout.evaluate(row),
        };
        tracing::debug!(
            trend_following = signals.trend_following,
            mean_reversion = signals.mean_reversion,
            breakout = signals.breakout,
            "alpha signals evaluated"
        );
        signals
    }
}
