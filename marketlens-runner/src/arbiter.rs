//! Cognitive arbitration: turn the quantitative state into a prompt, ask a
//! reasoning engine, and hand back its free text.
//!
//! The arbiter never fails. Any engine error is logged and replaced by a
//! diagnostic string, which the verdict parser then reads as HOLD / 0.5.

use std::time::Duration;

use marketlens_core::alpha::AlphaSignalSet;
use marketlens_core::features::{FeatureFrame, MarketState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of trailing closes included in the payload.
pub const RECENT_PRICES: usize = 20;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything the reasoning engine is shown. Raw OHLCV never leaves the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbiterPayload {
    pub symbol: String,
    pub alpha_probability: f64,
    pub market_state: MarketState,
    pub recent_prices: Vec<f64>,
}

impl ArbiterPayload {
    /// Payload for the latest row of `frame`. `None` for an empty frame.
    pub fn from_frame(frame: &FeatureFrame, signals: &AlphaSignalSet) -> Option<Self> {
        let latest = frame.latest()?;
        Some(Self {
            symbol: frame.symbol().to_string(),
            alpha_probability: signals.probability(),
            market_state: latest.market_state(),
            recent_prices: frame.recent_closes(RECENT_PRICES),
        })
    }
}

#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from reasoning engine")]
    HttpStatus { status: u16 },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("payload serialization failed: {0}")]
    Payload(String),
}

/// A text-generation backend.
pub trait ReasoningEngine: Send + Sync {
    /// Model identifier, used in diagnostics.
    fn model(&self) -> &str;

    /// Single completion for `prompt`. No retries.
    fn generate(&self, prompt: &str) -> Result<String, ReasoningError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama `/api/generate`, non-streaming.
pub struct OllamaEngine {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl OllamaEngine {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReasoningError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReasoningError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }
}

impl ReasoningEngine for OllamaEngine {
    fn model(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String, ReasoningError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .map_err(|e| ReasoningError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ReasoningError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body: GenerateResponse = resp
            .json()
            .map_err(|e| ReasoningError::MalformedResponse(e.to_string()))?;
        Ok(body.response)
    }
}

/// Deterministic prompt for `payload`.
pub fn build_prompt(payload: &ArbiterPayload) -> Result<String, ReasoningError> {
    let data =
        serde_json::to_string_pretty(payload).map_err(|e| ReasoningError::Payload(e.to_string()))?;
    Ok(format!(
        "You are a professional Indian market equity analyst.\n\
         Analyze the following quantitative data and provide a detailed structured response.\n\
         \n\
         REQUIRED OUTPUT FORMAT:\n\
         • VERDICT: [BUY / SELL / HOLD]\n\
         • CONFIDENCE: [0.0 - 1.0]\n\
         • RISK FACTORS: [Key risks identified]\n\
         • REASONING: [Step-by-step logic]\n\
         \n\
         DATA:\n\
         {data}\n"
    ))
}

/// Text returned in place of engine output when the engine call fails.
pub fn unavailable_message(error: &ReasoningError, model: &str) -> String {
    format!(
        "AI Reasoning Unavailable. Error: {error}. \
         Please ensure the reasoning engine is running with {model}."
    )
}

pub struct CognitiveArbiter {
    engine: Box<dyn ReasoningEngine>,
}

impl CognitiveArbiter {
    pub fn new(engine: Box<dyn ReasoningEngine>) -> Self {
        Self { engine }
    }

    pub fn model(&self) -> &str {
        self.engine.model()
    }

    /// Reasoning text for `payload`, or a diagnostic string on failure.
    pub fn arbitrate(&self, payload: &ArbiterPayload) -> String {
        let result = build_prompt(payload).and_then(|prompt| {
            tracing::info!(
                symbol = %payload.symbol,
                model = self.engine.model(),
                "requesting reasoning"
            );
            self.engine.generate(&prompt)
        });

        match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    symbol = %payload.symbol,
                    model = self.engine.model(),
                    error = %e,
                    "reasoning engine unavailable"
                );
                unavailable_message(&e, self.engine.model())
            }
        }
    }
}
