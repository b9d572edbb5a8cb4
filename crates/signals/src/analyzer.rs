//! The lexicon analyzer — a heuristic [`SignalAnalyzer`].

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::trace;

use colloquy_core::analyzer::SignalAnalyzer;
use colloquy_core::error::AnalysisError;
use colloquy_core::signal::{EntityKind, SignalBundle, SignalFlag};

use crate::entities;
use crate::lexicon::Lexicon;

/// Word-list and pattern based signal extraction.
///
/// Good enough for short assistant-style commands and questions; it makes no
/// claim to linguistic correctness.
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer {
    lexicon: Lexicon,
    /// Resolves relative dates. Today's local date when unset.
    reference_date: Option<NaiveDate>,
}

impl LexiconAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon,
            reference_date: None,
        }
    }

    /// Pin the date that "today" refers to.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Analyze synchronously.
    pub fn analyze_text(&self, text: &str, active_contexts: &[String]) -> SignalBundle {
        let cleaned = text.replace(['\u{2019}', '\u{2018}'], "'");
        let tokens = tokenize(&cleaned);
        let today = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());

        let mut bundle = SignalBundle::new(text)
            .with_active_contexts(active_contexts.iter().cloned());
        bundle.normalized = tokens.join(" ");
        bundle.word_count = tokens.len();
        bundle.entities = entities::extract(&cleaned, today);

        // Words covered by a date, time or number are not nouns.
        let entity_words: Vec<String> = bundle
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Date | EntityKind::Time | EntityKind::Number))
            .flat_map(|e| tokenize(&e.text))
            .collect();

        let mut nouns = Vec::new();
        let mut verbs = Vec::new();
        let mut adjectives = Vec::new();
        for token in &tokens {
            if let Some(lemma) = self.lexicon.verb_lemma(token) {
                verbs.push(lemma);
            } else if self.lexicon.is_adjective(token) {
                adjectives.push(token.clone());
            } else if !self.lexicon.is_stopword(token)
                && !entity_words.contains(token)
                && !Lexicon::is_negation(token)
                && token.chars().any(char::is_alphabetic)
            {
                nouns.push(token.trim_end_matches("'s").to_string());
            }
        }
        bundle = bundle
            .with_nouns(nouns)
            .with_verbs(verbs)
            .with_adjectives(adjectives);

        self.set_flags(&mut bundle, text, &tokens);
        trace!(
            words = bundle.word_count,
            nouns = ?bundle.nouns,
            verbs = ?bundle.verbs,
            entities = bundle.entities.len(),
            "Analyzed text"
        );
        bundle
    }

    fn set_flags(&self, bundle: &mut SignalBundle, raw: &str, tokens: &[String]) {
        let first = tokens.first().map(String::as_str).unwrap_or("");

        let is_question = raw.trim_end().ends_with('?')
            || Lexicon::is_question_word(first)
            || (Lexicon::is_question_aux(first) && tokens.len() > 1);
        let is_command = !is_question
            && (first == "please"
                || (self.lexicon.verb_lemma(first).is_some() && !Lexicon::is_question_aux(first)));
        let has_negation = tokens.iter().any(|t| Lexicon::is_negation(t));
        let has_future = tokens.iter().any(|t| Lexicon::is_future_marker(t))
            || raw.to_ascii_lowercase().contains("going to");
        let has_past = tokens.iter().any(|t| Lexicon::is_past_marker(t))
            || tokens
                .iter()
                .any(|t| t.ends_with("ed") && self.lexicon.verb_lemma(t).is_some_and(|l| &l != t));

        bundle.flags.set(SignalFlag::IsQuestion, is_question);
        bundle.flags.set(SignalFlag::IsCommand, is_command);
        bundle.flags.set(SignalFlag::HasNegation, has_negation);
        bundle.flags.set(SignalFlag::HasFuture, has_future);
        bundle.flags.set(SignalFlag::HasPast, has_past);
    }
}

#[async_trait]
impl SignalAnalyzer for LexiconAnalyzer {
    async fn analyze(
        &self,
        text: &str,
        active_contexts: &[String],
    ) -> Result<SignalBundle, AnalysisError> {
        Ok(self.analyze_text(text, active_contexts))
    }
}

/// Lower-cased words with surrounding punctuation removed. Inner `'`, `:`,
/// `-` and `.` survive (`it's`, `19:30`, `2026-10-18`, `2.5`).
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}
