//! Final report shapes.
//!
//! A request yields exactly one of two flat JSON objects: the full analysis,
//! or the failure envelope `{symbol, error, verdict: "ERROR", status: "failed"}`.

use marketlens_core::features::MarketState;
use serde::{Deserialize, Serialize};

use crate::verdict::Action;

pub const ERROR_VERDICT: &str = "ERROR";
pub const FAILED_STATUS: &str = "failed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub verdict: Action,
    /// Rounded to 3 places.
    pub confidence: f64,
    /// Rounded to 4 places.
    pub position_size: f64,
    /// Rounded to 4 places.
    pub stop_loss_pct: f64,
    pub market_state: MarketState,
    pub llm_reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEnvelope {
    pub symbol: String,
    pub error: String,
    pub verdict: String,
    pub status: String,
}

impl FailureEnvelope {
    pub fn new(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            error: error.into(),
            verdict: ERROR_VERDICT.to_string(),
            status: FAILED_STATUS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarketIntelligenceReport {
    Success(AnalysisReport),
    Failure(FailureEnvelope),
}

impl MarketIntelligenceReport {
    pub fn symbol(&self) -> &str {
        match self {
            MarketIntelligenceReport::Success(r) => &r.symbol,
            MarketIntelligenceReport::Failure(f) => &f.symbol,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MarketIntelligenceReport::Success(_))
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_is_flat() {
        let report = MarketIntelligenceReport::Failure(FailureEnvelope::new("TCS", "boom"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "symbol": "TCS",
                "error": "boom",
                "verdict": "ERROR",
                "status": "failed"
            })
        );
        assert!(!report.is_success());
    }

    #[test]
    fn success_report_round_trips_as_success() {
        let report = MarketIntelligenceReport::Success(AnalysisReport {
            symbol: "INFY".into(),
            verdict: Action::Buy,
            confidence: 0.9,
            position_size: 0.016,
            stop_loss_pct: 41.2345,
            market_state: MarketState::default(),
            llm_reasoning: "VERDICT: BUY".into(),
        });
        let text = serde_json::to_string(&report).unwrap();
        assert!(text.contains("\"verdict\":\"BUY\""));
        assert!(text.contains("\"market_state\":{\"trend_regime\":0"));
        let back: MarketIntelligenceReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report);
        assert_eq!(back.symbol(), "INFY");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(0.8249, 3), 0.825);
        assert_eq!(round_to(0.016000000000000004, 4), 0.016);
    }
}
