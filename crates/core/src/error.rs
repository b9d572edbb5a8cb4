//! Error types for the colloquy domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Note what is *not* here: an unmatched utterance, an ambiguous one, a
//! missing parameter or a rejected answer are ordinary
//! [`Response`](crate::response::Response)s, not errors.

use thiserror::Error;

/// The top-level error type for all colloquy operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Intent registration ---
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    // --- Signal extraction ---
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    // --- Dialogue engine ---
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Rejections raised when an intent definition is registered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("intent id cannot be empty")]
    EmptyId,

    #[error("intent '{0}' is already registered")]
    Duplicate(String),

    #[error("intent '{0}' has no required rules")]
    MissingRequiredRules(String),

    #[error("intent '{0}' has no fulfiller")]
    MissingFulfiller(String),

    #[error("invalid definition for intent '{intent}': {reason}")]
    Invalid { intent: String, reason: String },
}

/// Failure of the signal extractor. Propagates to the caller of `execute`.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("extractor unavailable: {0}")]
    Unavailable(String),

    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Raised by an intent's fulfiller. Caught by the orchestrator and turned
/// into an apology response.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("fulfillment failed: {0}")]
pub struct FulfillmentError(pub String);

impl FulfillmentError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Programmer errors detected while a turn is running.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("intent '{0}' is not registered")]
    UnknownIntent(String),

    #[error("follow-up '{follow_up}' of '{intent}' targets unknown intent '{target}'")]
    UnknownFollowUpTarget {
        intent: String,
        follow_up: String,
        target: String,
    },

    #[error("intent '{intent}' has no parameter '{param}'")]
    UnknownParameter { intent: String, param: String },
}
