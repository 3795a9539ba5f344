//! Fundamental quality score.
//!
//! Five independent checks worth 20 points each. Not part of the price
//! pipeline; there is no fundamentals vendor.

use serde::{Deserialize, Serialize};

const POINTS_PER_CHECK: u8 = 20;

/// Annual fundamentals, percentages expressed as plain numbers (15.0 = 15%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub roic: f64,
    pub rev_growth: f64,
    pub de_ratio: f64,
    pub fcf: f64,
    pub margin_trend: f64,
}

/// Score in `0..=100`.
pub fn fundamental_score(f: &FundamentalSnapshot) -> u8 {
    let checks = [
        f.roic > 15.0,
        f.rev_growth > 10.0,
        f.de_ratio < 1.0,
        f.fcf > 0.0,
        f.margin_trend > 0.0,
    ];
    checks.iter().filter(|&&c| c).count() as u8 * POINTS_PER_CHECK
}
