//! MarketLens Runner: reasoning, verdict parsing and the inference pipeline.
//!
//! This crate builds on `marketlens-core` to provide:
//! - Cognitive arbitration against a pluggable reasoning engine (Ollama by default)
//! - A deterministic verdict parser for free-text engine output
//! - The `Orchestrator`, which sequences every stage and never raises
//! - Report types, application config and service metadata

pub mod arbiter;
pub mod config;
pub mod info;
pub mod pipeline;
pub mod report;
pub mod verdict;

pub use arbiter::{
    build_prompt, ArbiterPayload, CognitiveArbiter, OllamaEngine, ReasoningEngine, ReasoningError,
};
pub use config::{AppConfig, ConfigError};
pub use info::EngineInfo;
pub use pipeline::{collector_from_config, Orchestrator, PipelineError, SetupError};
pub use report::{AnalysisReport, FailureEnvelope, MarketIntelligenceReport};
pub use verdict::{parse as parse_verdict, Action, Verdict};
