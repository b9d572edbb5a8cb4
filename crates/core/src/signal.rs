//! Signal Bundle — the normalized linguistic features of one utterance.
//!
//! A bundle is produced once per turn by a [`SignalAnalyzer`](crate::analyzer::SignalAnalyzer)
//! and is read-only afterwards. Scoring, follow-up resolution and parameter
//! extraction all work against this type, never against raw text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The kind of an extracted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Date,
    Time,
    Place,
    Person,
    Number,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Place => "place",
            Self::Person => "person",
            Self::Number => "number",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity found in the utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,

    /// The text span as it appeared in the utterance.
    pub text: String,

    /// Parsed value (ISO date, `HH:MM`, number, ...) when the extractor has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Entity {
    pub fn new(kind: EntityKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// The value a parameter receives from this entity: the parsed value if
    /// present, the raw text otherwise.
    pub fn resolved(&self) -> serde_json::Value {
        self.value
            .clone()
            .unwrap_or_else(|| serde_json::Value::String(self.text.clone()))
    }
}

/// Boolean utterance flags a booster can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalFlag {
    IsQuestion,
    IsCommand,
    HasNegation,
    HasFuture,
    HasPast,
}

/// The set of flags raised for an utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFlags {
    pub is_question: bool,
    pub is_command: bool,
    pub has_negation: bool,
    pub has_future: bool,
    pub has_past: bool,
}

impl SignalFlags {
    pub fn get(&self, flag: SignalFlag) -> bool {
        match flag {
            SignalFlag::IsQuestion => self.is_question,
            SignalFlag::IsCommand => self.is_command,
            SignalFlag::HasNegation => self.has_negation,
            SignalFlag::HasFuture => self.has_future,
            SignalFlag::HasPast => self.has_past,
        }
    }

    pub fn set(&mut self, flag: SignalFlag, value: bool) {
        match flag {
            SignalFlag::IsQuestion => self.is_question = value,
            SignalFlag::IsCommand => self.is_command = value,
            SignalFlag::HasNegation => self.has_negation = value,
            SignalFlag::HasFuture => self.has_future = value,
            SignalFlag::HasPast => self.has_past = value,
        }
    }
}

/// Normalized linguistic features for one utterance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    pub raw: String,
    pub normalized: String,
    pub nouns: BTreeSet<String>,
    pub verbs: BTreeSet<String>,
    pub adjectives: BTreeSet<String>,
    pub entities: Vec<Entity>,
    pub flags: SignalFlags,
    pub word_count: usize,

    /// Names of the contexts that were active when the utterance was analyzed.
    pub active_contexts: BTreeSet<String>,
}

impl SignalBundle {
    /// Start a bundle for `raw`, with a default normalization (lower-cased,
    /// whitespace collapsed) and word count. Analyzers usually overwrite both.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");
        let word_count = normalized.split_whitespace().count();
        Self {
            raw,
            normalized,
            word_count,
            ..Self::default()
        }
    }

    pub fn with_nouns<I, S>(mut self, nouns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nouns.extend(nouns.into_iter().map(|s| s.into().to_lowercase()));
        self
    }

    pub fn with_verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verbs.extend(verbs.into_iter().map(|s| s.into().to_lowercase()));
        self
    }

    pub fn with_adjectives<I, S>(mut self, adjectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adjectives
            .extend(adjectives.into_iter().map(|s| s.into().to_lowercase()));
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_flag(mut self, flag: SignalFlag) -> Self {
        self.flags.set(flag, true);
        self
    }

    pub fn with_active_contexts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_contexts
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn has_noun(&self, term: &str) -> bool {
        self.nouns.contains(term)
    }

    pub fn has_verb(&self, term: &str) -> bool {
        self.verbs.contains(term)
    }

    pub fn has_adjective(&self, term: &str) -> bool {
        self.adjectives.contains(term)
    }

    pub fn has_entity(&self, kind: EntityKind) -> bool {
        self.entities.iter().any(|e| e.kind == kind)
    }

    /// The first entity of the given kind, in utterance order.
    pub fn first_entity(&self, kind: EntityKind) -> Option<&Entity> {
        self.entities.iter().find(|e| e.kind == kind)
    }

    pub fn is_context_active(&self, name: &str) -> bool {
        self.active_contexts.contains(name)
    }
}
