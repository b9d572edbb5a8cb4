//! Intent Definition — the declarative record describing how to recognize,
//! parameterize and fulfill a user request.
//!
//! Rules are tagged data ([`Matcher`], [`Condition`]) so they can be loaded
//! from configuration and validated once, at registration. Behaviour is
//! attached through the traits in [`crate::behavior`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use crate::behavior::{
    ContextDeriver, DefaultProducer, Extractor, Fulfiller, ParamModifier, Validator,
};
use crate::error::RegistrationError;
use crate::signal::{EntityKind, SignalBundle, SignalFlag};

// ── Rules ─────────────────────────────────────────────────────────────────

/// An OR-set over nouns, verbs and adjectives. Matches if any listed term is
/// present in the corresponding set of the bundle.
/// Terms are compared against the lower-cased sets of a bundle, so they are
/// lower-cased when built or deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matcher {
    #[serde(
        default,
        deserialize_with = "lowercase_terms",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub nouns: Vec<String>,

    #[serde(
        default,
        deserialize_with = "lowercase_terms",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub verbs: Vec<String>,

    #[serde(
        default,
        deserialize_with = "lowercase_terms",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub adjectives: Vec<String>,
}

fn lowercase_terms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let terms = Vec::<String>::deserialize(deserializer)?;
    Ok(terms.into_iter().map(|t| t.to_lowercase()).collect())
}

impl Matcher {
    pub fn nouns<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().or_nouns(terms)
    }

    pub fn verbs<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().or_verbs(terms)
    }

    pub fn adjectives<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().or_adjectives(terms)
    }

    pub fn or_nouns<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nouns.extend(terms.into_iter().map(|s| s.into().to_lowercase()));
        self
    }

    pub fn or_verbs<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verbs.extend(terms.into_iter().map(|s| s.into().to_lowercase()));
        self
    }

    pub fn or_adjectives<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adjectives
            .extend(terms.into_iter().map(|s| s.into().to_lowercase()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nouns.is_empty() && self.verbs.is_empty() && self.adjectives.is_empty()
    }

    pub fn matches(&self, bundle: &SignalBundle) -> bool {
        self.nouns.iter().any(|t| bundle.has_noun(t))
            || self.verbs.iter().any(|t| bundle.has_verb(t))
            || self.adjectives.iter().any(|t| bundle.has_adjective(t))
    }

    fn validate(&self, intent: &str, what: &str) -> Result<(), RegistrationError> {
        if self.is_empty() {
            return Err(invalid(intent, format!("{what} has no terms")));
        }
        let blank = self
            .nouns
            .iter()
            .chain(&self.verbs)
            .chain(&self.adjectives)
            .any(|t| t.trim().is_empty());
        if blank {
            return Err(invalid(intent, format!("{what} contains a blank term")));
        }
        let cased = self
            .nouns
            .iter()
            .chain(&self.verbs)
            .chain(&self.adjectives)
            .find(|t| t.chars().any(char::is_uppercase));
        if let Some(term) = cased {
            return Err(invalid(
                intent,
                format!("{what} term '{term}' is not lower case and can never match"),
            ));
        }
        Ok(())
    }
}

/// What a booster reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Condition {
    /// A boolean utterance flag is raised.
    Flag { flag: SignalFlag },
    /// At least one entity of the kind was extracted.
    Entity { entity: EntityKind },
    /// A context with this name is active.
    ContextActive { context: String },
    /// A term matcher is satisfied.
    Terms(Matcher),
}

impl Condition {
    pub fn flag(flag: SignalFlag) -> Self {
        Self::Flag { flag }
    }

    pub fn entity(entity: EntityKind) -> Self {
        Self::Entity { entity }
    }

    pub fn context_active(name: impl Into<String>) -> Self {
        Self::ContextActive {
            context: name.into(),
        }
    }

    pub fn holds(&self, bundle: &SignalBundle) -> bool {
        match self {
            Self::Flag { flag } => bundle.flags.get(*flag),
            Self::Entity { entity } => bundle.has_entity(*entity),
            Self::ContextActive { context } => bundle.is_context_active(context),
            Self::Terms(matcher) => matcher.matches(bundle),
        }
    }
}

/// Adds `weight` to the score when its condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booster {
    #[serde(flatten)]
    pub condition: Condition,
    pub weight: f64,
}

/// Subtracts `penalty` from the score when its rule matches.
///
/// The penalty is a magnitude; a negative number is read as its absolute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntiPattern {
    #[serde(flatten)]
    pub rule: Matcher,
    pub penalty: f64,
}

// ── Parameters ────────────────────────────────────────────────────────────

/// The entity type a parameter is extracted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Date,
    Time,
    Place,
    Person,
    Number,
    /// The normalized utterance text.
    Any,
}

impl EntityType {
    /// The bundle entity kind this type reads, `None` for [`EntityType::Any`].
    pub fn entity_kind(self) -> Option<EntityKind> {
        match self {
            Self::Date => Some(EntityKind::Date),
            Self::Time => Some(EntityKind::Time),
            Self::Place => Some(EntityKind::Place),
            Self::Person => Some(EntityKind::Person),
            Self::Number => Some(EntityKind::Number),
            Self::Any => None,
        }
    }
}

/// How a parameter's value is pulled from a bundle.
#[derive(Clone)]
pub enum Extraction {
    ByEntityType(EntityType),
    Custom(Arc<dyn Extractor>),
}

impl std::fmt::Debug for Extraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByEntityType(t) => f.debug_tuple("ByEntityType").field(t).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// A named parameter of an intent.
#[derive(Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub extraction: Extraction,
    pub required: bool,
    pub default_value: Option<Value>,
    pub default_producer: Option<Arc<dyn DefaultProducer>>,
    pub validator: Option<Arc<dyn Validator>>,
    /// Asked when the parameter is required and missing.
    pub prompt: String,
}

impl ParameterSpec {
    /// An optional parameter extracted by entity type.
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            name: name.into(),
            extraction: Extraction::ByEntityType(entity_type),
            required: false,
            default_value: None,
            default_producer: None,
            validator: None,
            prompt: String::new(),
        }
    }

    /// Mark the parameter required, asking `prompt` when it is missing.
    pub fn required(mut self, prompt: impl Into<String>) -> Self {
        self.required = true;
        self.prompt = prompt.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_default_producer(mut self, producer: impl DefaultProducer + 'static) -> Self {
        self.default_producer = Some(Arc::new(producer));
        self
    }

    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extraction = Extraction::Custom(Arc::new(extractor));
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The configured default, evaluated now. Producers run on every call.
    pub fn resolve_default(&self) -> Option<Value> {
        match (&self.default_value, &self.default_producer) {
            (Some(value), _) => Some(value.clone()),
            (None, Some(producer)) => Some(producer.produce()),
            (None, None) => None,
        }
    }
}

impl std::fmt::Debug for ParameterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterSpec")
            .field("name", &self.name)
            .field("extraction", &self.extraction)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("default_producer", &self.default_producer.is_some())
            .field("validator", &self.validator.is_some())
            .field("prompt", &self.prompt)
            .finish()
    }
}

// ── Contexts and follow-ups ───────────────────────────────────────────────

/// A context written after a successful fulfillment.
#[derive(Clone)]
pub struct OutputContext {
    pub name: String,
    /// Number of completed turns the context stays active for.
    pub lifespan: u32,
    /// Builds the stored data. Without one, the collected parameters merged
    /// with the fulfillment's data object are stored.
    pub deriver: Option<Arc<dyn ContextDeriver>>,
}

impl OutputContext {
    pub fn new(name: impl Into<String>, lifespan: u32) -> Self {
        Self {
            name: name.into(),
            lifespan,
            deriver: None,
        }
    }

    pub fn with_deriver(mut self, deriver: impl ContextDeriver + 'static) -> Self {
        self.deriver = Some(Arc::new(deriver));
        self
    }
}

impl std::fmt::Debug for OutputContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputContext")
            .field("name", &self.name)
            .field("lifespan", &self.lifespan)
            .field("deriver", &self.deriver.is_some())
            .finish()
    }
}

/// A short utterance that continues this intent while a context is active.
#[derive(Clone)]
pub struct FollowUp {
    pub name: String,
    pub trigger_words: Vec<String>,
    pub requires_context: String,
    pub modifier: Option<Arc<dyn ParamModifier>>,
    /// Intent to run instead of the owning one.
    pub reuse_intent: Option<String>,
}

impl FollowUp {
    pub fn new<I, S>(name: impl Into<String>, requires_context: impl Into<String>, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            trigger_words: triggers.into_iter().map(|s| s.into().to_lowercase()).collect(),
            requires_context: requires_context.into(),
            modifier: None,
            reuse_intent: None,
        }
    }

    pub fn with_modifier(mut self, modifier: impl ParamModifier + 'static) -> Self {
        self.modifier = Some(Arc::new(modifier));
        self
    }

    pub fn reusing(mut self, intent_id: impl Into<String>) -> Self {
        self.reuse_intent = Some(intent_id.into());
        self
    }
}

impl std::fmt::Debug for FollowUp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowUp")
            .field("name", &self.name)
            .field("trigger_words", &self.trigger_words)
            .field("requires_context", &self.requires_context)
            .field("modifier", &self.modifier.is_some())
            .field("reuse_intent", &self.reuse_intent)
            .finish()
    }
}

// ── Definition ────────────────────────────────────────────────────────────

/// A complete intent: rules, parameters, behaviour, contexts and follow-ups.
///
/// Immutable once registered.
#[derive(Clone)]
pub struct IntentDefinition {
    pub id: String,
    /// Human-readable name, used in disambiguation choices.
    pub label: String,
    pub required_rules: Vec<Matcher>,
    pub boosters: Vec<Booster>,
    pub anti_patterns: Vec<AntiPattern>,
    pub parameters: Vec<ParameterSpec>,
    pub fulfiller: Option<Arc<dyn Fulfiller>>,
    pub output_contexts: Vec<OutputContext>,
    pub follow_ups: Vec<FollowUp>,
}

impl IntentDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            required_rules: Vec::new(),
            boosters: Vec::new(),
            anti_patterns: Vec::new(),
            parameters: Vec::new(),
            fulfiller: None,
            output_contexts: Vec::new(),
            follow_ups: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn require(mut self, matcher: Matcher) -> Self {
        self.required_rules.push(matcher);
        self
    }

    pub fn boost(mut self, condition: Condition, weight: f64) -> Self {
        self.boosters.push(Booster { condition, weight });
        self
    }

    pub fn penalize(mut self, rule: Matcher, penalty: f64) -> Self {
        self.anti_patterns.push(AntiPattern { rule, penalty });
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_fulfiller(mut self, fulfiller: impl Fulfiller + 'static) -> Self {
        self.fulfiller = Some(Arc::new(fulfiller));
        self
    }

    pub fn with_shared_fulfiller(mut self, fulfiller: Arc<dyn Fulfiller>) -> Self {
        self.fulfiller = Some(fulfiller);
        self
    }

    pub fn with_output_context(mut self, context: OutputContext) -> Self {
        self.output_contexts.push(context);
        self
    }

    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_ups.push(follow_up);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Rewrite the named parameter in place, e.g. to attach an extractor to a
    /// parameter loaded from a manifest. Unknown names are left alone.
    pub fn map_parameter(
        mut self,
        name: &str,
        f: impl FnOnce(ParameterSpec) -> ParameterSpec,
    ) -> Self {
        if let Some(i) = self.parameters.iter().position(|p| p.name == name) {
            let spec = self.parameters.remove(i);
            self.parameters.insert(i, f(spec));
        }
        self
    }

    /// Rewrite the named output context in place.
    pub fn map_output_context(
        mut self,
        name: &str,
        f: impl FnOnce(OutputContext) -> OutputContext,
    ) -> Self {
        if let Some(i) = self.output_contexts.iter().position(|c| c.name == name) {
            let ctx = self.output_contexts.remove(i);
            self.output_contexts.insert(i, f(ctx));
        }
        self
    }

    /// Rewrite the named follow-up in place.
    pub fn map_follow_up(mut self, name: &str, f: impl FnOnce(FollowUp) -> FollowUp) -> Self {
        if let Some(i) = self.follow_ups.iter().position(|fu| fu.name == name) {
            let fu = self.follow_ups.remove(i);
            self.follow_ups.insert(i, f(fu));
        }
        self
    }

    /// Does any required-rule matcher accept the bundle?
    pub fn matches_required(&self, bundle: &SignalBundle) -> bool {
        self.required_rules.iter().any(|m| m.matches(bundle))
    }

    /// Validate that the definition is well-formed.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.id.trim().is_empty() {
            return Err(RegistrationError::EmptyId);
        }
        if self.required_rules.is_empty() {
            return Err(RegistrationError::MissingRequiredRules(self.id.clone()));
        }
        if self.fulfiller.is_none() {
            return Err(RegistrationError::MissingFulfiller(self.id.clone()));
        }

        for (i, matcher) in self.required_rules.iter().enumerate() {
            matcher.validate(&self.id, &format!("required rule #{i}"))?;
        }
        for (i, booster) in self.boosters.iter().enumerate() {
            if !booster.weight.is_finite() {
                return Err(invalid(&self.id, format!("booster #{i} weight is not finite")));
            }
            match &booster.condition {
                Condition::Terms(m) => m.validate(&self.id, &format!("booster #{i}"))?,
                Condition::ContextActive { context } if context.trim().is_empty() => {
                    return Err(invalid(&self.id, format!("booster #{i} names no context")));
                }
                _ => {}
            }
        }
        for (i, anti) in self.anti_patterns.iter().enumerate() {
            if !anti.penalty.is_finite() {
                return Err(invalid(&self.id, format!("anti-pattern #{i} penalty is not finite")));
            }
            anti.rule.validate(&self.id, &format!("anti-pattern #{i}"))?;
        }

        let mut names = HashSet::new();
        for param in &self.parameters {
            if param.name.trim().is_empty() {
                return Err(invalid(&self.id, "parameter name cannot be empty"));
            }
            if !names.insert(param.name.as_str()) {
                return Err(invalid(&self.id, format!("duplicate parameter '{}'", param.name)));
            }
            if param.required && param.prompt.trim().is_empty() {
                return Err(invalid(
                    &self.id,
                    format!("required parameter '{}' has no prompt", param.name),
                ));
            }
            if param.default_value.is_some() && param.default_producer.is_some() {
                return Err(invalid(
                    &self.id,
                    format!("parameter '{}' has both a default value and a producer", param.name),
                ));
            }
        }

        for ctx in &self.output_contexts {
            if ctx.name.trim().is_empty() {
                return Err(invalid(&self.id, "output context name cannot be empty"));
            }
            if ctx.lifespan == 0 {
                return Err(invalid(
                    &self.id,
                    format!("output context '{}' has a zero lifespan", ctx.name),
                ));
            }
        }

        let mut follow_up_names = HashSet::new();
        for fu in &self.follow_ups {
            if !follow_up_names.insert(fu.name.as_str()) {
                return Err(invalid(&self.id, format!("duplicate follow-up '{}'", fu.name)));
            }
            if fu.trigger_words.iter().all(|t| t.trim().is_empty()) {
                return Err(invalid(&self.id, format!("follow-up '{}' has no triggers", fu.name)));
            }
            if fu.requires_context.trim().is_empty() {
                return Err(invalid(
                    &self.id,
                    format!("follow-up '{}' requires no context", fu.name),
                ));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for IntentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("required_rules", &self.required_rules)
            .field("boosters", &self.boosters)
            .field("anti_patterns", &self.anti_patterns)
            .field("parameters", &self.parameters)
            .field("fulfiller", &self.fulfiller.is_some())
            .field("output_contexts", &self.output_contexts)
            .field("follow_ups", &self.follow_ups)
            .finish()
    }
}

fn invalid(intent: &str, reason: impl Into<String>) -> RegistrationError {
    RegistrationError::Invalid {
        intent: intent.to_string(),
        reason: reason.into(),
    }
}
