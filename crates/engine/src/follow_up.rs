//! Follow-Up Resolver — does a short utterance continue a recent intent?
//!
//! For every active context, every registered follow-up that requires it is
//! scored:
//!
//! ```text
//! no trigger word present           → 0
//! trigger present                   → base
//!   word count ≤ very_short_words   → + very_short_bonus
//!   word count ≤ short_words        → + short_bonus
//!   owner's required rules match    → − self_sufficient_penalty
//! ```
//!
//! The resolver only reports the best candidate; whether it wins over the
//! primary intents is the router's call.

use colloquy_config::FollowUpConfig;
use colloquy_core::intent::{FollowUp, IntentDefinition};
use colloquy_core::signal::{EntityKind, SignalBundle};
use std::sync::Arc;
use tracing::trace;

use crate::registry::IntentRegistry;

/// The best follow-up found for an utterance.
#[derive(Debug, Clone)]
pub struct FollowUpMatch {
    /// Intent declaring the follow-up.
    pub owner: Arc<IntentDefinition>,
    pub follow_up: FollowUp,
    /// Intent to run: the reused one, or the owner.
    pub target_id: String,
    /// Active context that enabled the match.
    pub context_name: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct FollowUpResolver {
    config: FollowUpConfig,
}

impl FollowUpResolver {
    pub fn new(config: FollowUpConfig) -> Self {
        Self { config }
    }

    /// Find the best-scoring follow-up. Never matches without active contexts.
    pub fn resolve(
        &self,
        registry: &IntentRegistry,
        bundle: &SignalBundle,
        active_contexts: &[String],
    ) -> Option<FollowUpMatch> {
        if active_contexts.is_empty() {
            return None;
        }

        let words = raw_words(&bundle.raw);
        let mut best: Option<FollowUpMatch> = None;

        for context in active_contexts {
            for intent in registry.iter() {
                for fu in intent.follow_ups.iter().filter(|f| &f.requires_context == context) {
                    let score = self.score(intent, fu, bundle, &words);
                    trace!(follow_up = %fu.name, context = %context, score, "Scored follow-up");
                    if score <= 0.0 {
                        continue;
                    }
                    if best.as_ref().is_none_or(|b| score > b.score) {
                        best = Some(FollowUpMatch {
                            owner: Arc::clone(intent),
                            follow_up: fu.clone(),
                            target_id: fu.reuse_intent.clone().unwrap_or_else(|| intent.id.clone()),
                            context_name: context.clone(),
                            score,
                        });
                    }
                }
            }
        }

        best
    }

    fn score(
        &self,
        owner: &IntentDefinition,
        follow_up: &FollowUp,
        bundle: &SignalBundle,
        words: &[String],
    ) -> f64 {
        if !triggered(follow_up, bundle, words) {
            return 0.0;
        }

        let c = &self.config;
        let mut score = c.base;
        if bundle.word_count <= c.very_short_words {
            score += c.very_short_bonus;
        } else if bundle.word_count <= c.short_words {
            score += c.short_bonus;
        }
        if owner.matches_required(bundle) {
            score -= c.self_sufficient_penalty;
        }
        score.clamp(0.0, 1.0)
    }
}

impl Default for FollowUpResolver {
    fn default() -> Self {
        Self::new(FollowUpConfig::default())
    }
}

/// A trigger appears among the nouns, the verbs, the raw words, or the text of
/// a date entity.
fn triggered(follow_up: &FollowUp, bundle: &SignalBundle, words: &[String]) -> bool {
    follow_up.trigger_words.iter().any(|trigger| {
        if trigger.is_empty() {
            return false;
        }
        bundle.has_noun(trigger)
            || bundle.has_verb(trigger)
            || contains_phrase(words, trigger)
            || bundle
                .entities
                .iter()
                .filter(|e| e.kind == EntityKind::Date)
                .any(|e| e.text.to_lowercase().contains(trigger.as_str()))
    })
}

/// Lower-cased words of the raw text, punctuation stripped.
fn raw_words(raw: &str) -> Vec<String> {
    raw.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whole-word match; multi-word triggers must appear as a contiguous run.
fn contains_phrase(words: &[String], trigger: &str) -> bool {
    let needle: Vec<&str> = trigger.split_whitespace().collect();
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words
        .windows(needle.len())
        .any(|w| w.iter().zip(&needle).all(|(a, b)| a == b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::behavior::{FnFulfiller, Fulfillment, Params};
    use colloquy_core::intent::{Matcher, OutputContext};
    use colloquy_core::signal::Entity;

    fn weather() -> IntentDefinition {
        IntentDefinition::new("weather")
            .require(Matcher::nouns(["weather", "forecast"]))
            .with_fulfiller(FnFulfiller::new(|_: &Params| Ok(Fulfillment::text("sunny"))))
            .with_output_context(OutputContext::new("weather-followup", 2))
            .with_follow_up(FollowUp::new(
                "change-date",
                "weather-followup",
                ["tomorrow", "today", "weekend"],
            ))
    }

    fn registry() -> IntentRegistry {
        let mut registry = IntentRegistry::new();
        registry.register(weather()).unwrap();
        registry
    }

    fn active() -> Vec<String> {
        vec!["weather-followup".to_string()]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn never_matches_without_active_contexts() {
        let bundle = SignalBundle::new("And tomorrow?");
        assert!(FollowUpResolver::default().resolve(&registry(), &bundle, &[]).is_none());
    }

    #[test]
    fn short_trigger_scores_very_short_bonus() {
        let bundle = SignalBundle::new("And tomorrow?")
            .with_entity(Entity::new(EntityKind::Date, "tomorrow"));
        let found = FollowUpResolver::default()
            .resolve(&registry(), &bundle, &active())
            .unwrap();
        assert_eq!(found.target_id, "weather");
        assert_eq!(found.context_name, "weather-followup");
        assert!(approx(found.score, 0.7));
    }

    #[test]
    fn medium_length_gets_short_bonus() {
        let bundle = SignalBundle::new("what about this weekend then");
        let found = FollowUpResolver::default()
            .resolve(&registry(), &bundle, &active())
            .unwrap();
        assert!(approx(found.score, 0.55));
    }

    #[test]
    fn self_sufficient_query_is_penalized() {
        let bundle = SignalBundle::new("what is the weather going to be like tomorrow")
            .with_nouns(["weather"]);
        let found = FollowUpResolver::default()
            .resolve(&registry(), &bundle, &active())
            .unwrap();
        assert!(approx(found.score, 0.1));
    }

    #[test]
    fn trigger_must_be_a_whole_word() {
        let bundle = SignalBundle::new("todays");
        assert!(FollowUpResolver::default()
            .resolve(&registry(), &bundle, &active())
            .is_none());
    }

    #[test]
    fn unrelated_context_is_ignored() {
        let bundle = SignalBundle::new("tomorrow");
        let other = vec!["reminder-followup".to_string()];
        assert!(FollowUpResolver::default()
            .resolve(&registry(), &bundle, &other)
            .is_none());
    }

    #[test]
    fn reuse_target_is_reported() {
        let mut registry = registry();
        registry
            .register(
                IntentDefinition::new("news")
                    .require(Matcher::nouns(["news"]))
                    .with_fulfiller(FnFulfiller::new(|_: &Params| Ok(Fulfillment::text("n"))))
                    .with_follow_up(
                        FollowUp::new("more", "weather-followup", ["more"]).reusing("weather"),
                    ),
            )
            .unwrap();
        let found = FollowUpResolver::default()
            .resolve(&registry, &SignalBundle::new("more"), &active())
            .unwrap();
        assert_eq!(found.owner.id, "news");
        assert_eq!(found.target_id, "weather");
    }

    #[test]
    fn multi_word_trigger() {
        let words = raw_words("How about next week?");
        assert!(contains_phrase(&words, "next week"));
        assert!(!contains_phrase(&words, "week next"));
    }
}
