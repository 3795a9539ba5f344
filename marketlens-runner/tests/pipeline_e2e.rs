//! End-to-end pipeline tests with in-process vendors and reasoning engines.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use marketlens_core::alpha::AlphaEnsemble;
use marketlens_core::data::{DataCollector, DataError, DataProvider, DataSource, FetchResult};
use marketlens_core::domain::{Bar, OhlcvSeries};
use marketlens_core::features::FeatureBuilder;
use marketlens_core::risk::RiskSizer;
use marketlens_runner::{
    Action, CognitiveArbiter, MarketIntelligenceReport, Orchestrator, ReasoningEngine,
    ReasoningError,
};

// ── Stubs ────────────────────────────────────────────────────────────

/// Steady uptrend with rising volume.
fn uptrend(symbol: &str, n: usize) -> OhlcvSeries {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 500.0 * 1.004_f64.powi(i as i32) + (i as f64 * 0.9).sin() * 2.0;
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open: close - 1.0,
                high: close + 4.0,
                low: close - 4.0,
                close,
                volume: 100_000.0 + i as f64 * 1_500.0,
            }
        })
        .collect();
    OhlcvSeries::new(symbol, bars)
}

struct SeriesProvider {
    bars: usize,
    calls: Arc<AtomicUsize>,
}

impl DataProvider for SeriesProvider {
    fn name(&self) -> &str {
        "stub_series"
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchResult {
            series: uptrend(symbol, self.bars),
            source: DataSource::CsvImport,
        })
    }
}

struct DownProvider;

impl DataProvider for DownProvider {
    fn name(&self) -> &str {
        "stub_down"
    }

    fn fetch(&self, _symbol: &str) -> Result<FetchResult, DataError> {
        Err(DataError::NetworkUnreachable("connection refused".into()))
    }
}

struct FixedEngine(&'static str);

impl ReasoningEngine for FixedEngine {
    fn model(&self) -> &str {
        "stub"
    }

    fn generate(&self, _prompt: &str) -> Result<String, ReasoningError> {
        Ok(self.0.to_string())
    }
}

struct OfflineEngine;

impl ReasoningEngine for OfflineEngine {
    fn model(&self) -> &str {
        "llama3.2:3b"
    }

    fn generate(&self, _prompt: &str) -> Result<String, ReasoningError> {
        Err(ReasoningError::Transport("connection refused".into()))
    }
}

/// Captures every prompt it is sent.
struct RecordingEngine {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ReasoningEngine for RecordingEngine {
    fn model(&self) -> &str {
        "recorder"
    }

    fn generate(&self, prompt: &str) -> Result<String, ReasoningError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("VERDICT: HOLD CONFIDENCE: 0.6".to_string())
    }
}

fn orchestrator(
    providers: Vec<Box<dyn DataProvider>>,
    engine: impl ReasoningEngine + 'static,
) -> Orchestrator {
    Orchestrator::new(
        DataCollector::new(providers),
        CognitiveArbiter::new(Box::new(engine)),
        RiskSizer::default(),
    )
}

fn series_provider(bars: usize) -> (Box<dyn DataProvider>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = SeriesProvider {
        bars,
        calls: Arc::clone(&calls),
    };
    (Box::new(provider), calls)
}

// ── Success path ─────────────────────────────────────────────────────

#[test]
fn buy_verdict_end_to_end() {
    let (provider, _) = series_provider(100);
    let o = orchestrator(vec![provider], FixedEngine("VERDICT: BUY CONFIDENCE: 0.9"));

    let r = match o.analyze("INFY") {
        MarketIntelligenceReport::Success(r) => r,
        other => panic!("expected success, got {other:?}"),
    };
    assert_eq!(r.symbol, "INFY");
    assert_eq!(r.verdict, Action::Buy);
    assert_eq!(r.confidence, 0.9);
    assert_eq!(r.position_size, 0.016);
    assert!(r.stop_loss_pct > 0.0);
    assert_eq!(r.market_state.trend_regime, 1);
    assert_eq!(r.llm_reasoning, "VERDICT: BUY CONFIDENCE: 0.9");
}

#[test]
fn success_json_has_flat_report_fields() {
    let (provider, _) = series_provider(100);
    let o = orchestrator(vec![provider], FixedEngine("SELL, confidence 0.3"));
    let json = serde_json::to_value(o.analyze("TCS")).unwrap();
    for key in [
        "symbol",
        "verdict",
        "confidence",
        "position_size",
        "stop_loss_pct",
        "market_state",
        "llm_reasoning",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["verdict"], "SELL");
    // long-only sizing: low confidence sizes to zero
    assert_eq!(json["position_size"], 0.0);
    assert_eq!(json["market_state"].as_object().unwrap().len(), 6);
}

#[test]
fn engine_outage_degrades_to_hold() {
    let (provider, _) = series_provider(100);
    let o = orchestrator(vec![provider], OfflineEngine);
    let MarketIntelligenceReport::Success(r) = o.analyze("SBIN") else {
        panic!("reasoning outage must not fail the request");
    };
    assert_eq!(r.verdict, Action::Hold);
    assert_eq!(r.confidence, 0.5);
    assert_eq!(r.position_size, 0.0);
    assert!(r.llm_reasoning.starts_with("AI Reasoning Unavailable."));
    assert!(r.llm_reasoning.contains("llama3.2:3b"));
}

#[test]
fn failover_is_invisible_in_report() {
    let (provider, calls) = series_provider(100);
    let o = orchestrator(
        vec![Box::new(DownProvider), provider],
        FixedEngine("HOLD 0.55"),
    );
    let report = o.analyze("ITC");
    assert!(report.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn engine_sees_only_derived_state() {
    let (provider, _) = series_provider(100);
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let engine = RecordingEngine {
        prompts: Arc::clone(&prompts),
    };
    let o = orchestrator(vec![provider], engine);
    assert!(o.analyze("INFY").is_success());

    let frame = FeatureBuilder::new().build(&uptrend("INFY", 100)).unwrap();
    let signals = AlphaEnsemble::new().evaluate(&frame);
    let latest = frame.latest().unwrap();

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let (_, data) = prompts[0].split_once("DATA:\n").unwrap();
    let payload: serde_json::Value = serde_json::from_str(data.trim()).unwrap();

    let mut keys: Vec<&str> = payload
        .as_object()
        .unwrap()
        .keys()
        .map(|k| k.as_str())
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["alpha_probability", "market_state", "recent_prices", "symbol"]
    );
    assert_eq!(payload["symbol"], "INFY");

    let expected = frame.recent_closes(20);
    let sent: Vec<f64> = payload["recent_prices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(sent.len(), 20);
    assert_eq!(expected.len(), 20);
    for (a, b) in sent.iter().zip(&expected) {
        assert!((a - b).abs() <= 1e-9 * b.abs(), "{a} vs {b}");
    }
    assert!((expected[19] - latest.close).abs() < 1e-12);

    let probability = payload["alpha_probability"].as_f64().unwrap();
    assert!((probability - signals.probability()).abs() < 1e-12);

    assert_eq!(
        payload["market_state"],
        serde_json::to_value(latest.market_state()).unwrap()
    );
    for raw in ["\"open\"", "\"high\"", "\"low\"", "\"volume\""] {
        assert!(!data.contains(raw), "raw field {raw} leaked into prompt");
    }
}

// ── Failure envelope ─────────────────────────────────────────────────

#[test]
fn short_history_yields_envelope() {
    let (provider, _) = series_provider(10);
    let o = orchestrator(vec![provider], FixedEngine("BUY 0.9"));
    let json = serde_json::to_value(o.analyze("TINY")).unwrap();
    assert_eq!(json["symbol"], "TINY");
    assert_eq!(json["verdict"], "ERROR");
    assert_eq!(json["status"], "failed");
    assert!(json["error"].as_str().unwrap().contains("insufficient history"));
    assert!(json.get("confidence").is_none());
}

#[test]
fn all_vendors_down_yields_envelope() {
    let o = orchestrator(
        vec![Box::new(DownProvider), Box::new(DownProvider)],
        FixedEngine("BUY 0.9"),
    );
    let MarketIntelligenceReport::Failure(f) = o.analyze("GHOST") else {
        panic!("expected envelope");
    };
    assert_eq!(
        f.error,
        "failed to fetch market data for GHOST from all providers"
    );
}

// ── Batch ────────────────────────────────────────────────────────────

#[test]
fn analyze_many_preserves_order_and_isolates_failures() {
    struct PickyProvider;
    impl DataProvider for PickyProvider {
        fn name(&self) -> &str {
            "picky"
        }
        fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
            let bars = if symbol == "SHORT" { 20 } else { 90 };
            Ok(FetchResult {
                series: uptrend(symbol, bars),
                source: DataSource::CsvImport,
            })
        }
    }

    let o = orchestrator(
        vec![Box::new(PickyProvider)],
        FixedEngine("VERDICT: BUY CONFIDENCE: 0.75"),
    );
    let symbols: Vec<String> = ["INFY", "SHORT", "TCS", "WIPRO", "INFY"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let reports = o.analyze_many(&symbols);

    assert_eq!(reports.len(), symbols.len());
    for (report, symbol) in reports.iter().zip(&symbols) {
        assert_eq!(report.symbol(), symbol);
    }
    assert!(!reports[1].is_success());
    assert!(reports[0].is_success() && reports[2].is_success());
    assert_eq!(reports[0], reports[4]);
}
