//! # Colloquy Signals
//!
//! A reference implementation of the signal-extraction boundary. It turns a
//! line of text into a [`SignalBundle`](colloquy_core::SignalBundle) using
//! word lists and a handful of patterns:
//!
//! - nouns, verbs (lemmatized) and adjectives from a [`Lexicon`]
//! - dates (`today`, `tomorrow`, weekdays, `next week`, ISO dates), times
//!   (`7pm`, `19:30`, `noon`), numbers, places and people as entities
//! - question, command, negation, future and past flags
//!
//! Swap it for a real NLP service by implementing
//! [`SignalAnalyzer`](colloquy_core::SignalAnalyzer).

mod analyzer;
mod entities;
mod lexicon;

pub use analyzer::LexiconAnalyzer;
pub use lexicon::Lexicon;
