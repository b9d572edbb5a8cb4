//! Configuration loading, validation, and management for colloquy.
//!
//! Loads configuration from `~/.colloquy/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.colloquy/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rule scoring
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Confidence bands used for routing
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Follow-up scoring weights
    #[serde(default)]
    pub follow_up: FollowUpConfig,

    /// Turn history
    #[serde(default)]
    pub history: HistoryConfig,

    /// User-facing phrasing of engine-generated responses
    #[serde(default)]
    pub phrases: PhraseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Score of an intent whose required rules match, before boosters and
    /// anti-patterns.
    #[serde(default = "default_base_score")]
    pub base_score: f64,
}

fn default_base_score() -> f64 {
    0.5
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: default_base_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// At or above: fulfill immediately.
    #[serde(default = "default_high")]
    pub high: f64,

    /// At or above: fulfill, hedged.
    #[serde(default = "default_medium")]
    pub medium: f64,

    /// Candidates at most this far below the top one are ambiguous with it.
    #[serde(default = "default_ambiguity_margin")]
    pub ambiguity_margin: f64,
}

fn default_high() -> f64 {
    0.7
}
fn default_medium() -> f64 {
    0.45
}
fn default_ambiguity_margin() -> f64 {
    0.15
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
            ambiguity_margin: default_ambiguity_margin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpConfig {
    /// Score of a follow-up whose trigger word appears.
    #[serde(default = "default_follow_up_base")]
    pub base: f64,

    #[serde(default = "default_very_short_words")]
    pub very_short_words: usize,

    #[serde(default = "default_very_short_bonus")]
    pub very_short_bonus: f64,

    #[serde(default = "default_short_words")]
    pub short_words: usize,

    #[serde(default = "default_short_bonus")]
    pub short_bonus: f64,

    /// Subtracted when the utterance also satisfies the intent's own
    /// required rules on its own.
    #[serde(default = "default_self_sufficient_penalty")]
    pub self_sufficient_penalty: f64,
}

fn default_follow_up_base() -> f64 {
    0.4
}
fn default_very_short_words() -> usize {
    3
}
fn default_very_short_bonus() -> f64 {
    0.3
}
fn default_short_words() -> usize {
    5
}
fn default_short_bonus() -> f64 {
    0.15
}
fn default_self_sufficient_penalty() -> f64 {
    0.3
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            base: default_follow_up_base(),
            very_short_words: default_very_short_words(),
            very_short_bonus: default_very_short_bonus(),
            short_words: default_short_words(),
            short_bonus: default_short_bonus(),
            self_sufficient_penalty: default_self_sufficient_penalty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of completed turns kept per session.
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseConfig {
    /// Prefixed to medium-confidence answers, used in rotation.
    #[serde(default = "default_hedges")]
    pub hedges: Vec<String>,

    #[serde(default = "default_fallback_question")]
    pub fallback_question: String,

    #[serde(default = "default_fallback_statement")]
    pub fallback_statement: String,

    #[serde(default = "default_apology")]
    pub apology: String,

    /// Lead-in of a disambiguation; the choice labels follow.
    #[serde(default = "default_disambiguation")]
    pub disambiguation: String,
}

fn default_hedges() -> Vec<String> {
    vec![
        "I think".into(),
        "If I understood you correctly,".into(),
        "I'm not completely sure, but".into(),
    ]
}
fn default_fallback_question() -> String {
    "I'm not sure how to answer that yet.".into()
}
fn default_fallback_statement() -> String {
    "Sorry, I didn't understand that. Could you rephrase it?".into()
}
fn default_apology() -> String {
    "Sorry, something went wrong while handling that. Please try again.".into()
}
fn default_disambiguation() -> String {
    "Did you mean".into()
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            hedges: default_hedges(),
            fallback_question: default_fallback_question(),
            fallback_statement: default_fallback_statement(),
            apology: default_apology(),
            disambiguation: default_disambiguation(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default path (~/.colloquy/config.toml).
    ///
    /// Environment overrides:
    /// - `COLLOQUY_CONFIG` — path of the config file
    /// - `COLLOQUY_HISTORY_LIMIT` — number of turns kept per session
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("COLLOQUY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"));
        let mut config = Self::load_from(&config_path)?;

        if let Ok(limit) = std::env::var("COLLOQUY_HISTORY_LIMIT") {
            config.history.limit = limit.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "COLLOQUY_HISTORY_LIMIT must be a positive integer, got '{limit}'"
                ))
            })?;
            config.validate()?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "Loaded engine configuration");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".colloquy")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !(0.0..=1.0).contains(&t.medium) || !(0.0..=1.0).contains(&t.high) || t.medium > t.high {
            return Err(ConfigError::ValidationError(
                "thresholds must satisfy 0.0 <= medium <= high <= 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&t.ambiguity_margin) {
            return Err(ConfigError::ValidationError(
                "ambiguity_margin must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scoring.base_score) {
            return Err(ConfigError::ValidationError(
                "base_score must be between 0.0 and 1.0".into(),
            ));
        }
        if self.follow_up.short_words < self.follow_up.very_short_words {
            return Err(ConfigError::ValidationError(
                "follow_up.short_words must be >= follow_up.very_short_words".into(),
            ));
        }
        if self.history.limit == 0 {
            return Err(ConfigError::ValidationError(
                "history.limit must be at least 1".into(),
            ));
        }
        if self.phrases.hedges.iter().all(|h| h.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "phrases.hedges needs at least one phrase".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string (for `colloquy config`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
