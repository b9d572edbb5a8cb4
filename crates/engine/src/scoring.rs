//! Scoring Engine — confidence of each intent for a bundle.
//!
//! ```text
//! no required rule matches   → 0 (excluded)
//! otherwise                  → base + Σ boosters that hold − Σ anti-patterns that match
//!                              clamped to [0, 1]
//! ```
//!
//! Boosters and anti-patterns are all evaluated; nothing short-circuits.

use colloquy_config::ScoringConfig;
use colloquy_core::intent::IntentDefinition;
use colloquy_core::signal::SignalBundle;
use std::sync::Arc;
use tracing::trace;

use crate::registry::IntentRegistry;

/// An intent and its score for the current bundle.
#[derive(Debug, Clone)]
pub struct ScoredIntent {
    pub intent: Arc<IntentDefinition>,
    pub score: f64,
}

impl ScoredIntent {
    pub fn id(&self) -> &str {
        &self.intent.id
    }
}

#[derive(Debug, Clone)]
pub struct Scorer {
    base_score: f64,
}

impl Scorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            base_score: config.base_score,
        }
    }

    /// Score one intent, in `[0, 1]`.
    pub fn score(&self, intent: &IntentDefinition, bundle: &SignalBundle) -> f64 {
        if !intent.matches_required(bundle) {
            return 0.0;
        }

        let boost: f64 = intent
            .boosters
            .iter()
            .filter(|b| b.condition.holds(bundle))
            .map(|b| b.weight)
            .sum();

        let penalty: f64 = intent
            .anti_patterns
            .iter()
            .filter(|a| a.rule.matches(bundle))
            .map(|a| a.penalty.abs())
            .sum();

        let score = (self.base_score + boost - penalty).clamp(0.0, 1.0);
        trace!(intent = %intent.id, boost, penalty, score, "Scored intent");
        score
    }

    /// Score every registered intent; drop zeros; sort by score, highest first.
    /// Ties keep registration order.
    pub fn rank(&self, registry: &IntentRegistry, bundle: &SignalBundle) -> Vec<ScoredIntent> {
        let mut ranked: Vec<ScoredIntent> = registry
            .iter()
            .map(|intent| ScoredIntent {
                score: self.score(intent, bundle),
                intent: Arc::clone(intent),
            })
            .filter(|s| s.score > 0.0)
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}
