//! Property tests for the deterministic pipeline stages.
//!
//! Uses proptest to verify:
//! 1. History gate: under 60 bars is rejected, 60 or more gives a shorter non-empty frame
//! 2. No look-ahead: appending bars never changes an existing feature row
//! 3. Ensemble bounds: every vote is 0 or 1 and the probability is in [0, 1]

use chrono::NaiveDate;
use proptest::prelude::*;
use marketlens_core::alpha::AlphaEnsemble;
use marketlens_core::domain::{Bar, OhlcvSeries};
use marketlens_core::features::{FeatureBuilder, FeatureError, MIN_HISTORY};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Daily returns within ±5% and positive volumes.
fn arb_path(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-0.05..0.05_f64, 1_000.0..1_000_000.0_f64), len)
}

fn series_from_path(path: &[(f64, f64)]) -> OhlcvSeries {
    let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut price = 250.0_f64;
    let bars = path
        .iter()
        .enumerate()
        .map(|(i, &(ret, volume))| {
            let open = price;
            price *= 1.0 + ret;
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(price) * 1.005,
                low: open.min(price) * 0.995,
                close: price,
                volume,
            }
        })
        .collect();
    OhlcvSeries::new("PROP", bars)
}

// ── 1. History gate ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn short_history_rejected(path in arb_path(0..MIN_HISTORY)) {
        let series = series_from_path(&path);
        let result = FeatureBuilder::new().build(&series);
        let rejected = matches!(
            result,
            Err(FeatureError::InsufficientHistory { available, required })
                if available == path.len() && required == MIN_HISTORY
        );
        prop_assert!(rejected);
    }

    #[test]
    fn enough_history_gives_shorter_frame(path in arb_path(MIN_HISTORY..160)) {
        let series = series_from_path(&path);
        let frame = FeatureBuilder::new().build(&series).unwrap();
        prop_assert!(!frame.is_empty());
        prop_assert!(frame.len() < series.len());
        for row in frame.rows() {
            prop_assert!(row.is_complete());
        }
    }
}

// ── 2. No look-ahead ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn appending_bars_leaves_history_unchanged(path in arb_path(90..130)) {
        let full = series_from_path(&path);
        let prefix = OhlcvSeries::new("PROP", full.bars[..80].to_vec());

        let short = FeatureBuilder::new().build(&prefix).unwrap();
        let long = FeatureBuilder::new().build(&full).unwrap();

        for (a, b) in short.rows().iter().zip(long.rows()) {
            prop_assert_eq!(a.date, b.date);
            prop_assert!((a.ema_slow - b.ema_slow).abs() < 1e-9);
            prop_assert!((a.atr - b.atr).abs() < 1e-9);
            prop_assert!((a.rsi - b.rsi).abs() < 1e-9);
            prop_assert_eq!(a.market_state(), b.market_state());
        }
    }
}

// ── 3. Ensemble bounds ───────────────────────────────────────────────

proptest! {
    #[test]
    fn ensemble_probability_bounded(path in arb_path(MIN_HISTORY..200)) {
        let frame = FeatureBuilder::new().build(&series_from_path(&path)).unwrap();
        let signals = AlphaEnsemble::new().evaluate(&frame);
        for v in [signals.trend_following, signals.mean_reversion, signals.breakout] {
            prop_assert!(v == 0 || v == 1);
        }
        let p = signals.probability();
        prop_assert!((0.0..=1.0).contains(&p));
    }
}
