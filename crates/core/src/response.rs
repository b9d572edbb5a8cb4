//! The outcome of one call to the dialogue engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One option offered in a disambiguation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub intent_id: String,
    pub confidence: f64,
}

/// What the engine answers for an utterance.
///
/// Serialized with a `type` tag. Prompts and disambiguations also carry
/// `requires_user_input: true`, and fallbacks carry `fallback: true`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// An intent ran to completion.
    Fulfilled {
        intent_id: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        /// Confidence was only medium; `text` carries a hedge phrase.
        #[serde(default)]
        hedged: bool,
        /// The utterance was read as a continuation of an earlier intent.
        #[serde(default)]
        follow_up: bool,
    },

    /// A required parameter is missing; the next utterance answers `awaiting_input`.
    Prompt {
        intent_id: String,
        text: String,
        awaiting_input: String,
    },

    /// Several intents are about equally likely. Advisory only: the next
    /// utterance is a fresh turn.
    Disambiguation { text: String, choices: Vec<Choice> },

    /// Nothing matched with enough confidence.
    Fallback { text: String },

    /// The selected intent failed while fulfilling.
    Apology { intent_id: String, text: String },
}

impl Response {
    pub fn text(&self) -> &str {
        match self {
            Self::Fulfilled { text, .. }
            | Self::Prompt { text, .. }
            | Self::Disambiguation { text, .. }
            | Self::Fallback { text }
            | Self::Apology { text, .. } => text,
        }
    }

    /// The intent this response concerns, if one was selected.
    pub fn intent_id(&self) -> Option<&str> {
        match self {
            Self::Fulfilled { intent_id, .. }
            | Self::Prompt { intent_id, .. }
            | Self::Apology { intent_id, .. } => Some(intent_id),
            Self::Disambiguation { .. } | Self::Fallback { .. } => None,
        }
    }

    pub fn requires_user_input(&self) -> bool {
        matches!(self, Self::Prompt { .. } | Self::Disambiguation { .. })
    }

    pub fn awaiting_input(&self) -> Option<&str> {
        match self {
            Self::Prompt { awaiting_input, .. } => Some(awaiting_input),
            _ => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn is_hedged(&self) -> bool {
        matches!(self, Self::Fulfilled { hedged: true, .. })
    }

    pub fn is_follow_up(&self) -> bool {
        matches!(self, Self::Fulfilled { follow_up: true, .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Fulfilled { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}

/// Wire shape of [`Response`]: the same variants plus the derived flags.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Wire<'a> {
    Fulfilled {
        intent_id: &'a str,
        text: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<&'a Value>,
        hedged: bool,
        follow_up: bool,
    },
    Prompt {
        intent_id: &'a str,
        text: &'a str,
        awaiting_input: &'a str,
        requires_user_input: bool,
    },
    Disambiguation {
        text: &'a str,
        choices: &'a [Choice],
        requires_user_input: bool,
    },
    Fallback {
        text: &'a str,
        fallback: bool,
    },
    Apology {
        intent_id: &'a str,
        text: &'a str,
    },
}

impl Serialize for Response {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Fulfilled {
                intent_id,
                text,
                data,
                hedged,
                follow_up,
            } => Wire::Fulfilled {
                intent_id,
                text,
                data: data.as_ref(),
                hedged: *hedged,
                follow_up: *follow_up,
            },
            Self::Prompt {
                intent_id,
                text,
                awaiting_input,
            } => Wire::Prompt {
                intent_id,
                text,
                awaiting_input,
                requires_user_input: true,
            },
            Self::Disambiguation { text, choices } => Wire::Disambiguation {
                text,
                choices,
                requires_user_input: true,
            },
            Self::Fallback { text } => Wire::Fallback {
                text,
                fallback: true,
            },
            Self::Apology { intent_id, text } => Wire::Apology { intent_id, text },
        };
        wire.serialize(serializer)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}
