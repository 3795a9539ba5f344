//! Service metadata, printed by `marketlens info`.

use serde::{Deserialize, Serialize};

pub const ENGINE_NAME: &str = "MarketLens Intelligence Engine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub status: String,
    pub engine: String,
    pub version: String,
    pub model: String,
    pub commands: Vec<String>,
}

impl EngineInfo {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            status: "online".into(),
            engine: ENGINE_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            model: model.into(),
            commands: vec!["analyze <SYMBOL>...".into(), "info".into()],
        }
    }
}
