//! The inference pipeline.
//!
//! collect → features → alpha ensemble → stop from latest ATR → payload →
//! arbitrate → parse verdict → size from parsed confidence → report.
//!
//! Data and feature failures become the failure envelope; reasoning failures
//! are already absorbed by the arbiter. Nothing here panics on bad input.

use rayon::prelude::*;
use thiserror::Error;

use marketlens_core::alpha::AlphaEnsemble;
use marketlens_core::data::{
    AlphaVantageProvider, CollectError, CsvProvider, DataCollector, DataError, DataProvider,
    MarketStackProvider,
};
use marketlens_core::features::{FeatureBuilder, FeatureError};
use marketlens_core::risk::RiskSizer;

use crate::arbiter::{ArbiterPayload, CognitiveArbiter, OllamaEngine, ReasoningError};
use crate::config::{AppConfig, ConfigError};
use crate::report::{round_to, AnalysisReport, FailureEnvelope, MarketIntelligenceReport};
use crate::verdict;

/// Fatal per-request errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error("no complete feature rows for {symbol}")]
    EmptyFrame { symbol: String },
}

/// Errors building an orchestrator from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("data vendor setup failed: {0}")]
    Vendor(#[from] DataError),

    #[error("reasoning engine setup failed: {0}")]
    Reasoning(#[from] ReasoningError),
}

/// Vendor chain from config: AlphaVantage, MarketStack, then the CSV
/// directory when one is configured.
pub fn collector_from_config(config: &AppConfig) -> Result<DataCollector, DataError> {
    let vendors = &config.vendors;
    let mut collector = DataCollector::default()
        .with_provider(Box::new(AlphaVantageProvider::new(
            vendors.alphavantage_key.clone(),
        )?))
        .with_provider(Box::new(MarketStackProvider::new(
            vendors.marketstack_key.clone(),
        )?));
    if let Some(dir) = &vendors.csv_dir {
        collector = collector.with_provider(Box::new(CsvProvider::new(dir.clone())));
    }
    Ok(collector)
}

/// Wires every stage together. Holds no per-request state.
pub struct Orchestrator {
    collector: DataCollector,
    features: FeatureBuilder,
    ensemble: AlphaEnsemble,
    arbiter: CognitiveArbiter,
    risk: RiskSizer,
}

impl Orchestrator {
    pub fn new(collector: DataCollector, arbiter: CognitiveArbiter, risk: RiskSizer) -> Self {
        Self {
            collector,
            features: FeatureBuilder::new(),
            ensemble: AlphaEnsemble::new(),
            arbiter,
            risk,
        }
    }

    /// Production wiring: configured vendors and an Ollama engine.
    ///
    /// The config is validated first, so an out-of-range value is an error
    /// rather than a panic in [`RiskSizer::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let engine = OllamaEngine::new(
            config.reasoning.url.clone(),
            config.reasoning.model.clone(),
            config.reasoning.timeout(),
        )?;
        Ok(Self::new(
            collector_from_config(config)?,
            CognitiveArbiter::new(Box::new(engine)),
            RiskSizer::new(config.risk.max_risk),
        ))
    }

    /// Append a vendor after the configured chain.
    pub fn with_provider(mut self, provider: Box<dyn DataProvider>) -> Self {
        self.collector = self.collector.with_provider(provider);
        self
    }

    pub fn collector(&self) -> &DataCollector {
        &self.collector
    }

    pub fn model(&self) -> &str {
        self.arbiter.model()
    }

    /// Analyse one symbol. Always returns a report.
    pub fn analyze(&self, symbol: &str) -> MarketIntelligenceReport {
        match self.run(symbol) {
            Ok(report) => MarketIntelligenceReport::Success(report),
            Err(e) => {
                tracing::error!(symbol, error = %e, "analysis failed");
                MarketIntelligenceReport::Failure(FailureEnvelope::new(symbol, e.to_string()))
            }
        }
    }

    /// Analyse symbols in parallel. Output order matches input order.
    pub fn analyze_many(&self, symbols: &[String]) -> Vec<MarketIntelligenceReport> {
        symbols.par_iter().map(|s| self.analyze(s)).collect()
    }

    fn run(&self, symbol: &str) -> Result<AnalysisReport, PipelineError> {
        let fetched = self.collector.fetch(symbol)?;
        let frame = self.features.build(&fetched.series)?;
        let signals = self.ensemble.evaluate(&frame);

        let latest = frame.latest().ok_or_else(|| PipelineError::EmptyFrame {
            symbol: symbol.to_string(),
        })?;
        let stop = self.risk.stop(latest.atr);
        let market_state = latest.market_state();

        let payload = ArbiterPayload::from_frame(&frame, &signals).ok_or_else(|| {
            PipelineError::EmptyFrame {
                symbol: symbol.to_string(),
            }
        })?;

        tracing::info!(
            symbol,
            source = ?fetched.source,
            rows = frame.len(),
            alpha_probability = payload.alpha_probability,
            "generating reasoning"
        );
        let text = self.arbiter.arbitrate(&payload);
        let verdict = verdict::parse(&text);
        let size = self.risk.size(verdict.confidence);

        tracing::info!(
            symbol,
            verdict = %verdict.action,
            confidence = verdict.confidence,
            position_size = size,
            "analysis complete"
        );

        Ok(AnalysisReport {
            symbol: symbol.to_string(),
            verdict: verdict.action,
            confidence: round_to(verdict.confidence, 3),
            position_size: round_to(size, 4),
            stop_loss_pct: round_to(stop, 4),
            market_state,
            llm_reasoning: verdict.raw_reasoning,
        })
    }
}
