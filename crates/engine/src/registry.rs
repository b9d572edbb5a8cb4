//! Intent Registry — the declarative intents supplied by plugins.
//!
//! The registry is filled once and then shared read-only (behind an `Arc`)
//! by every session. Definitions are validated on the way in, so scoring and
//! routing never see a malformed rule.

use colloquy_core::error::{EngineError, RegistrationError};
use colloquy_core::intent::IntentDefinition;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A registry of intent definitions, in registration order.
#[derive(Debug, Default)]
pub struct IntentRegistry {
    intents: Vec<Arc<IntentDefinition>>,
    index: HashMap<String, usize>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an intent. Rejects malformed definitions and duplicate ids.
    pub fn register(&mut self, definition: IntentDefinition) -> Result<(), RegistrationError> {
        definition.validate()?;
        if self.index.contains_key(&definition.id) {
            return Err(RegistrationError::Duplicate(definition.id));
        }
        debug!(
            intent = %definition.id,
            rules = definition.required_rules.len(),
            params = definition.parameters.len(),
            "Registered intent"
        );
        self.index.insert(definition.id.clone(), self.intents.len());
        self.intents.push(Arc::new(definition));
        Ok(())
    }

    /// Register under an explicit id, overriding the definition's own.
    pub fn register_as(
        &mut self,
        id: impl Into<String>,
        mut definition: IntentDefinition,
    ) -> Result<(), RegistrationError> {
        definition.id = id.into();
        self.register(definition)
    }

    /// Get an intent by id.
    pub fn get(&self, id: &str) -> Option<&Arc<IntentDefinition>> {
        self.index.get(id).map(|&i| &self.intents[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All registered ids, in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.intents.iter().map(|d| d.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<IntentDefinition>> {
        self.intents.iter()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Check that every follow-up which reuses another intent points at a
    /// registered one.
    pub fn check_follow_up_targets(&self) -> Result<(), EngineError> {
        for intent in &self.intents {
            for fu in &intent.follow_ups {
                if let Some(target) = &fu.reuse_intent {
                    if !self.contains(target) {
                        return Err(EngineError::UnknownFollowUpTarget {
                            intent: intent.id.clone(),
                            follow_up: fu.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::behavior::{FnFulfiller, Fulfillment, Params};
    use colloquy_core::intent::{FollowUp, Matcher};

    fn intent(id: &str) -> IntentDefinition {
        IntentDefinition::new(id)
            .require(Matcher::nouns(["time"]))
            .with_fulfiller(FnFulfiller::new(|_: &Params| Ok(Fulfillment::text("ok"))))
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = IntentRegistry::new();
        registry.register(intent("time")).unwrap();
        registry.register(intent("date")).unwrap();
        assert!(registry.get("time").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.ids(), vec!["time", "date"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_rejected() {
        let mut registry = IntentRegistry::new();
        registry.register(intent("time")).unwrap();
        let err = registry.register(intent("time")).unwrap_err();
        assert_eq!(err, RegistrationError::Duplicate("time".into()));
    }

    #[test]
    fn invalid_rejected() {
        let mut registry = IntentRegistry::new();
        let err = registry
            .register(IntentDefinition::new("bare").require(Matcher::nouns(["x"])))
            .unwrap_err();
        assert_eq!(err, RegistrationError::MissingFulfiller("bare".into()));
        assert!(registry.is_empty());
    }

    #[test]
    fn register_as_overrides_id() {
        let mut registry = IntentRegistry::new();
        registry.register_as("clock", intent("time")).unwrap();
        assert!(registry.contains("clock"));
        assert!(!registry.contains("time"));
    }

    #[test]
    fn follow_up_targets_checked() {
        let mut registry = IntentRegistry::new();
        registry
            .register(intent("time").with_follow_up(
                FollowUp::new("again", "time-ctx", ["again"]).reusing("ghost"),
            ))
            .unwrap();
        assert!(matches!(
            registry.check_follow_up_targets(),
            Err(EngineError::UnknownFollowUpTarget { .. })
        ));

        registry.register(intent("ghost")).unwrap();
        assert!(registry.check_follow_up_targets().is_ok());
    }
}
