//! # Colloquy Engine
//!
//! Turns one utterance at a time into a [`Response`](colloquy_core::Response),
//! given a registry of declarative intents and a per-conversation [`Session`].
//!
//! ```text
//! utterance ─► SignalAnalyzer ─► SignalBundle ─┬─► Scorer ──────────┐
//!                                              └─► FollowUpResolver ┴─► Router
//!                                                                        │
//!            Response ◄── fulfill / prompt / disambiguate / fall back ◄──┘
//! ```

pub mod context;
pub mod follow_up;
pub mod history;
pub mod manifest;
pub mod orchestrator;
pub mod parameters;
pub mod registry;
pub mod routing;
pub mod scoring;
pub mod session;

pub use context::{ContextEntry, ContextStore};
pub use follow_up::{FollowUpMatch, FollowUpResolver};
pub use history::{TurnHistory, TurnOutcome, TurnRecord};
pub use manifest::{IntentManifest, IntentSpec, ManifestError};
pub use orchestrator::DialogueEngine;
pub use parameters::AnswerError;
pub use registry::IntentRegistry;
pub use routing::{Route, Router, SCORE_EPSILON};
pub use scoring::{ScoredIntent, Scorer};
pub use session::{PendingCollection, Session};
