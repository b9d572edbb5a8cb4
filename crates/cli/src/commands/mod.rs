pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod intents;

use std::path::Path;
use std::sync::Arc;

use colloquy_config::EngineConfig;
use colloquy_engine::DialogueEngine;
use colloquy_signals::LexiconAnalyzer;

use crate::demo;

/// Load the configuration, from `path` when given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The demo intents behind the lexicon analyzer.
pub fn build_engine(config: EngineConfig) -> Result<DialogueEngine, Box<dyn std::error::Error>> {
    let registry = demo::registry().map_err(|e| format!("Failed to load demo intents: {e}"))?;
    let engine = DialogueEngine::new(
        Arc::new(registry),
        Arc::new(LexiconAnalyzer::default()),
        config,
    )?;
    Ok(engine)
}
