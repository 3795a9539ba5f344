//! Confidence-scaled position sizing and volatility stop distance.
//!
//! ```text
//! position_size = clamp((confidence - 0.5) * 2 * max_risk, 0, max_risk)
//! stop_loss     = atr * 2.5
//! ```
//!
//! Sizing is long-only: confidence at or below 0.5 sizes to zero regardless
//! of the action label.

use serde::{Deserialize, Serialize};

/// Largest fraction of capital at risk on one position.
pub const DEFAULT_MAX_RISK: f64 = 0.02;

/// Stop distance in multiples of ATR.
pub const STOP_MULTIPLIER: f64 = 2.5;

/// Position size for `confidence` under a `max_risk` cap.
pub fn position_size(confidence: f64, max_risk: f64) -> f64 {
    ((confidence - 0.5) * 2.0 * max_risk).clamp(0.0, max_risk)
}

/// Stop-loss distance for the given volatility.
pub fn stop_loss(volatility: f64) -> f64 {
    volatility * STOP_MULTIPLIER
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSizer {
    pub max_risk: f64,
}

impl Default for RiskSizer {
    fn default() -> Self {
        Self {
            max_risk: DEFAULT_MAX_RISK,
        }
    }
}

impl RiskSizer {
    pub fn new(max_risk: f64) -> Self {
        assert!(
            max_risk > 0.0 && max_risk <= 1.0,
            "max_risk must be in (0, 1]"
        );
        Self { max_risk }
    }

    pub fn size(&self, confidence: f64) -> f64 {
        position_size(confidence, self.max_risk)
    }

    pub fn stop(&self, volatility: f64) -> f64 {
        stop_loss(volatility)
    }
}
