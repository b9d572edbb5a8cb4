//! # Colloquy Core
//!
//! Domain types, traits, and error definitions for the colloquy dialogue engine.
//! This crate holds no engine logic — it defines the model every other crate
//! works against: what an utterance looks like once analyzed, what an intent
//! declares, and what a turn returns.
//!
//! ## Seams
//!
//! - [`SignalAnalyzer`] turns text into a [`SignalBundle`]
//! - [`Fulfiller`] and the smaller behaviour traits carry per-intent code
//! - [`EventBus`] lets observers follow a conversation

pub mod analyzer;
pub mod behavior;
pub mod error;
pub mod event;
pub mod intent;
pub mod response;
pub mod signal;

// Re-export key types at crate root for ergonomics
pub use analyzer::SignalAnalyzer;
pub use behavior::{
    ContextDeriver, DefaultProducer, Extractor, FnFulfiller, Fulfiller, Fulfillment,
    ParamModifier, Params, Validator, is_falsy,
};
pub use error::{AnalysisError, EngineError, Error, FulfillmentError, RegistrationError, Result};
pub use event::{DialogueEvent, EventBus};
pub use intent::{
    AntiPattern, Booster, Condition, EntityType, Extraction, FollowUp, IntentDefinition,
    Matcher, OutputContext, ParameterSpec,
};
pub use response::{Choice, Response};
pub use signal::{Entity, EntityKind, SignalBundle, SignalFlag, SignalFlags};
