//! Feature rows and the frame that holds them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One bar with every derived feature attached.
///
/// Flags are 0 or 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ret: f64,
    pub ret_mean_10: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub trend_strength: f64,
    pub trend_regime: u8,
    pub atr: f64,
    pub vol_regime: u8,
    pub vol_z: f64,
    pub accumulation: u8,
    pub distribution: u8,
    pub rsi: f64,
    pub exhaustion: u8,
    pub range_high: f64,
    pub range_low: f64,
    pub breakout: u8,
}

impl FeatureRow {
    /// True when every numeric column is finite.
    pub fn is_complete(&self) -> bool {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.ret,
            self.ret_mean_10,
            self.ema_fast,
            self.ema_slow,
            self.trend_strength,
            self.atr,
            self.vol_z,
            self.rsi,
            self.range_high,
            self.range_low,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    pub fn market_state(&self) -> MarketState {
        MarketState {
            trend_regime: self.trend_regime,
            volatility_regime: self.vol_regime,
            accumulation: self.accumulation,
            distribution: self.distribution,
            breakout: self.breakout,
            exhaustion: self.exhaustion,
        }
    }
}

/// The six regime flags shown to the reasoning engine and echoed in reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    pub trend_regime: u8,
    pub volatility_regime: u8,
    pub accumulation: u8,
    pub distribution: u8,
    pub breakout: u8,
    pub exhaustion: u8,
}

/// Complete feature rows for one symbol, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    symbol: String,
    rows: Vec<FeatureRow>,
}

impl FeatureFrame {
    pub fn new(symbol: impl Into<String>, rows: Vec<FeatureRow>) -> Self {
        Self {
            symbol: symbol.into(),
            rows,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// The last `n` closes (fewer if the frame is shorter), oldest first.
    pub fn recent_closes(&self, n: usize) -> Vec<f64> {
        let start = self.rows.len().saturating_sub(n);
        self.rows[start..].iter().map(|r| r.close).collect()
    }
}

/// Neutral, complete row for tests.
#[cfg(test)]
pub(crate) fn sample_row(close: f64) -> FeatureRow {
    FeatureRow {
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000.0,
        ret: 0.0,
        ret_mean_10: 0.0,
        ema_fast: close,
        ema_slow: close,
        trend_strength: 20.0,
        trend_regime: 1,
        atr: 1.5,
        vol_regime: 0,
        vol_z: 0.2,
        accumulation: 0,
        distribution: 0,
        rsi: 55.0,
        exhaustion: 0,
        range_high: close + 2.0,
        range_low: close - 2.0,
        breakout: 0,
    }
}
