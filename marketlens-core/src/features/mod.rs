//! Feature derivation: technical indicators and regime flags per bar.
//!
//! All window lengths are fixed. Numeric columns are `NaN` until their
//! lookback is satisfied and any row with a `NaN` numeric column is dropped.
//! Regime flags are plain comparisons and read 0 while their reference value
//! is still warming up, so they never cause a row to be dropped.

pub mod frame;

pub use frame::{FeatureFrame, FeatureRow, MarketState};

use crate::domain::OhlcvSeries;
use crate::indicators::rolling::{
    pct_change, rolling_max, rolling_mean, rolling_min, rolling_zscore, shift,
};
use crate::indicators::{Adx, Atr, Ema, Indicator, Rsi};
use thiserror::Error;

/// Minimum series length accepted by [`FeatureBuilder::build`].
pub const MIN_HISTORY: usize = 60;

pub const EMA_FAST: usize = 20;
pub const EMA_SLOW: usize = 50;
pub const ADX_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const ATR_REGIME_WINDOW: usize = 50;
pub const VOLUME_Z_WINDOW: usize = 30;
pub const RSI_PERIOD: usize = 14;
pub const RANGE_WINDOW: usize = 20;
pub const RETURN_MEAN_WINDOW: usize = 10;

const ACCUMULATION_Z: f64 = 1.0;
const DISTRIBUTION_Z: f64 = -1.0;
const EXHAUSTION_HIGH: f64 = 75.0;
const EXHAUSTION_LOW: f64 = 25.0;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(
        "insufficient history: {available} periods available, at least {required} required"
    )]
    InsufficientHistory { available: usize, required: usize },
}

fn flag(cond: bool) -> u8 {
    u8::from(cond)
}

/// Builds a [`FeatureFrame`] from an OHLCV series.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, series: &OhlcvSeries) -> Result<FeatureFrame, FeatureError> {
        let n = series.len();
        if n < MIN_HISTORY {
            return Err(FeatureError::InsufficientHistory {
                available: n,
                required: MIN_HISTORY,
            });
        }

        let bars = &series.bars;
        let closes = series.closes();
        let volumes = series.volumes();

        let ret = pct_change(&closes);
        let ret_mean_10 = rolling_mean(&ret, RETURN_MEAN_WINDOW);
        let ema_fast = Ema::new(EMA_FAST).compute(bars);
        let ema_slow = Ema::new(EMA_SLOW).compute(bars);
        let trend_strength = Adx::new(ADX_PERIOD).compute(bars);
        let atr = Atr::new(ATR_PERIOD).compute(bars);
        let atr_mean = rolling_mean(&atr, ATR_REGIME_WINDOW);
        let vol_z = rolling_zscore(&volumes, VOLUME_Z_WINDOW);
        let rsi = Rsi::new(RSI_PERIOD).compute(bars);
        // Range of the bars before the current one, so a new high can exceed it.
        let range_high = shift(&rolling_max(&closes, RANGE_WINDOW), 1);
        let range_low = shift(&rolling_min(&closes, RANGE_WINDOW), 1);

        let rows: Vec<FeatureRow> = (0..n)
            .filter_map(|i| {
                let bar = &bars[i];
                let accumulation = flag(vol_z[i] > ACCUMULATION_Z);
                let row = FeatureRow {
                    date: bar.date,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                    ret: ret[i],
                    ret_mean_10: ret_mean_10[i],
                    ema_fast: ema_fast[i],
                    ema_slow: ema_slow[i],
                    trend_strength: trend_strength[i],
                    trend_regime: flag(ema_fast[i] > ema_slow[i]),
                    atr: atr[i],
                    vol_regime: flag(atr[i] > atr_mean[i]),
                    vol_z: vol_z[i],
                    accumulation,
                    distribution: flag(vol_z[i] < DISTRIBUTION_Z),
                    rsi: rsi[i],
                    exhaustion: flag(rsi[i] > EXHAUSTION_HIGH || rsi[i] < EXHAUSTION_LOW),
                    range_high: range_high[i],
                    range_low: range_low[i],
                    breakout: flag(bar.close > range_high[i] && accumulation == 1),
                };
                row.is_complete().then_some(row)
            })
            .collect();

        if rows.is_empty() {
            return Err(FeatureError::InsufficientHistory {
                available: n,
                required: MIN_HISTORY,
            });
        }

        tracing::debug!(
            symbol = %series.symbol,
            input = n,
            rows = rows.len(),
            "feature frame built"
        );

        Ok(FeatureFrame::new(series.symbol.clone(), rows))
    }
}
