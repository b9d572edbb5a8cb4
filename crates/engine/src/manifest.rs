//! Intent manifests — the declarative half of intent definitions, in TOML.
//!
//! A manifest carries rules, parameters, output contexts and follow-ups.
//! Behaviour (the fulfiller, and any extractor, validator, deriver or
//! modifier) is attached in code, by intent id, when the manifest is
//! registered.
//!
//! # Example
//!
//! ```toml
//! [[intents]]
//! id = "weather"
//! label = "the weather"
//! required = [{ nouns = ["weather", "forecast"] }]
//! boosters = [{ when = "entity", entity = "place", weight = 0.2 }]
//! anti_patterns = [{ nouns = ["news"], penalty = 0.3 }]
//!
//! [[intents.parameters]]
//! name = "location"
//! entity = "place"
//! required = true
//! prompt = "Which city?"
//!
//! [[intents.output_contexts]]
//! name = "weather-followup"
//! lifespan = 2
//!
//! [[intents.follow_ups]]
//! name = "change-date"
//! context = "weather-followup"
//! triggers = ["tomorrow", "today"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use colloquy_core::error::RegistrationError;
use colloquy_core::intent::{
    AntiPattern, Booster, EntityType, FollowUp, IntentDefinition, Matcher, OutputContext,
    ParameterSpec,
};

use crate::registry::IntentRegistry;

/// Errors from loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid intent '{intent}' in manifest: {reason}")]
    Invalid { intent: String, reason: String },

    #[error("manifest file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// A set of intent declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentManifest {
    #[serde(default)]
    pub intents: Vec<IntentSpec>,
}

impl IntentManifest {
    /// Parse and validate a manifest.
    pub fn from_toml(toml_str: &str) -> Result<Self, ManifestError> {
        let manifest: IntentManifest = toml::from_str(toml_str)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        let manifest = Self::from_toml(&content)?;
        debug!(path = %path.display(), intents = manifest.intents.len(), "Loaded intent manifest");
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut ids = HashSet::new();
        for spec in &self.intents {
            spec.validate()?;
            if !ids.insert(spec.id.as_str()) {
                return Err(invalid(&spec.id, "declared more than once"));
            }
        }
        Ok(())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.intents.iter().map(|s| s.id.as_str()).collect()
    }

    /// Turn every declaration into a definition, let `bind` attach behaviour,
    /// and register the result.
    pub fn register_into<F>(&self, registry: &mut IntentRegistry, mut bind: F) -> Result<(), ManifestError>
    where
        F: FnMut(IntentDefinition) -> IntentDefinition,
    {
        for spec in &self.intents {
            registry.register(bind(spec.to_definition()))?;
        }
        Ok(())
    }
}

/// The declarative part of one intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentSpec {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Any matcher satisfied selects the intent.
    #[serde(default)]
    pub required: Vec<Matcher>,

    #[serde(default)]
    pub boosters: Vec<Booster>,

    #[serde(default)]
    pub anti_patterns: Vec<AntiPattern>,

    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,

    #[serde(default)]
    pub output_contexts: Vec<OutputContextDecl>,

    #[serde(default)]
    pub follow_ups: Vec<FollowUpDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    pub entity: EntityType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputContextDecl {
    pub name: String,
    pub lifespan: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpDecl {
    pub name: String,
    /// Context that must be active.
    pub context: String,
    pub triggers: Vec<String>,
    /// Intent to run instead of the declaring one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse: Option<String>,
}

impl IntentSpec {
    fn validate(&self) -> Result<(), ManifestError> {
        if self.id.trim().is_empty() {
            return Err(invalid("(empty)", "intent id cannot be empty"));
        }
        if self.required.is_empty() {
            return Err(invalid(&self.id, "no required rules"));
        }
        for param in &self.parameters {
            if param.required && param.prompt.trim().is_empty() {
                return Err(invalid(
                    &self.id,
                    format!("required parameter '{}' has no prompt", param.name),
                ));
            }
        }
        for ctx in &self.output_contexts {
            if ctx.lifespan == 0 {
                return Err(invalid(
                    &self.id,
                    format!("output context '{}' has a zero lifespan", ctx.name),
                ));
            }
        }
        Ok(())
    }

    /// The definition described by this declaration, without a fulfiller.
    pub fn to_definition(&self) -> IntentDefinition {
        let mut def = IntentDefinition::new(&self.id);
        if let Some(label) = &self.label {
            def = def.with_label(label);
        }
        def.required_rules = self.required.clone();
        def.boosters = self.boosters.clone();
        def.anti_patterns = self.anti_patterns.clone();

        for decl in &self.parameters {
            let mut param = ParameterSpec::new(&decl.name, decl.entity).with_prompt(&decl.prompt);
            param.required = decl.required;
            param.default_value = decl.default.clone();
            def = def.with_parameter(param);
        }
        for decl in &self.output_contexts {
            def = def.with_output_context(OutputContext::new(&decl.name, decl.lifespan));
        }
        for decl in &self.follow_ups {
            let mut fu = FollowUp::new(&decl.name, &decl.context, decl.triggers.iter().cloned());
            if let Some(target) = &decl.reuse {
                fu = fu.reusing(target);
            }
            def = def.with_follow_up(fu);
        }
        def
    }
}

fn invalid(intent: &str, reason: impl Into<String>) -> ManifestError {
    ManifestError::Invalid {
        intent: intent.to_string(),
        reason: reason.into(),
    }
}
