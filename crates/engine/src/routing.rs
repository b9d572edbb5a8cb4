//! Routing — turn a ranked candidate list and an optional follow-up into a
//! single decision.
//!
//! Order of checks:
//! 1. a follow-up wins if no primary is HIGH and it beats the best primary
//! 2. two or more candidates within the ambiguity margin (inclusive) of a top
//!    scoring at least MEDIUM → disambiguation
//! 3. top ≥ HIGH → confident
//! 4. top ≥ MEDIUM → hedged
//! 5. otherwise → fallback

use colloquy_config::ThresholdConfig;
use tracing::debug;

use crate::follow_up::FollowUpMatch;
use crate::scoring::ScoredIntent;

/// Tolerance for threshold comparisons of accumulated float weights.
pub const SCORE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub enum Route {
    FollowUp(FollowUpMatch),
    Ambiguous(Vec<ScoredIntent>),
    Confident(ScoredIntent),
    Hedged(ScoredIntent),
    Fallback,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FollowUp(_) => "follow_up",
            Self::Ambiguous(_) => "ambiguous",
            Self::Confident(_) => "confident",
            Self::Hedged(_) => "hedged",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    thresholds: ThresholdConfig,
}

impl Router {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// `ranked` must be sorted by descending score.
    pub fn decide(&self, ranked: &[ScoredIntent], follow_up: Option<FollowUpMatch>) -> Route {
        let t = &self.thresholds;
        let top = ranked.first();
        let top_score = top.map_or(0.0, |s| s.score);

        if let Some(fu) = follow_up {
            if !at_least(top_score, t.high) && fu.score > top_score + SCORE_EPSILON {
                debug!(follow_up = %fu.follow_up.name, score = fu.score, top_score, "Routing to follow-up");
                return Route::FollowUp(fu);
            }
        }

        let Some(top) = top else {
            return Route::Fallback;
        };

        if at_least(top.score, t.medium) {
            let close: Vec<ScoredIntent> = ranked
                .iter()
                .take_while(|c| top.score - c.score <= t.ambiguity_margin + SCORE_EPSILON)
                .cloned()
                .collect();
            if close.len() >= 2 {
                debug!(candidates = close.len(), top_score = top.score, "Ambiguous routing");
                return Route::Ambiguous(close);
            }
        }

        let route = if at_least(top.score, t.high) {
            Route::Confident(top.clone())
        } else if at_least(top.score, t.medium) {
            Route::Hedged(top.clone())
        } else {
            Route::Fallback
        };
        debug!(intent = %top.id(), score = top.score, route = route.name(), "Routing decision");
        route
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

fn at_least(score: f64, threshold: f64) -> bool {
    score + SCORE_EPSILON >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::behavior::{FnFulfiller, Fulfillment, Params};
    use colloquy_core::intent::{FollowUp, IntentDefinition, Matcher};
    use std::sync::Arc;

    fn scored(id: &str, score: f64) -> ScoredIntent {
        ScoredIntent {
            intent: Arc::new(
                IntentDefinition::new(id)
                    .require(Matcher::nouns([id]))
                    .with_fulfiller(FnFulfiller::new(|_: &Params| Ok(Fulfillment::text("ok")))),
            ),
            score,
        }
    }

    fn follow_up(score: f64) -> FollowUpMatch {
        let owner = scored("weather", 0.0).intent;
        FollowUpMatch {
            owner,
            follow_up: FollowUp::new("change-date", "weather-followup", ["tomorrow"]),
            target_id: "weather".into(),
            context_name: "weather-followup".into(),
            score,
        }
    }

    #[test]
    fn empty_is_fallback() {
        assert!(matches!(Router::default().decide(&[], None), Route::Fallback));
    }

    #[test]
    fn high_is_confident() {
        let route = Router::default().decide(&[scored("time", 0.5 + 0.2)], None);
        assert!(matches!(route, Route::Confident(s) if s.id() == "time"));
    }

    #[test]
    fn medium_is_hedged() {
        let route = Router::default().decide(&[scored("time", 0.6)], None);
        assert!(matches!(route, Route::Hedged(_)));
    }

    #[test]
    fn low_is_fallback() {
        let route = Router::default().decide(&[scored("time", 0.3)], None);
        assert!(matches!(route, Route::Fallback));
    }

    #[test]
    fn close_candidates_are_ambiguous() {
        let route = Router::default().decide(&[scored("a", 0.72), scored("b", 0.65)], None);
        match route {
            Route::Ambiguous(choices) => {
                let ids: Vec<_> = choices.iter().map(ScoredIntent::id).collect();
                assert_eq!(ids, vec!["a", "b"]);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn gap_equal_to_margin_is_ambiguous() {
        let route = Router::default().decide(&[scored("a", 0.75), scored("b", 0.6)], None);
        assert!(matches!(route, Route::Ambiguous(ref c) if c.len() == 2));

        let route = Router::default().decide(&[scored("a", 0.75), scored("b", 0.59)], None);
        assert!(matches!(route, Route::Confident(_)));
    }

    #[test]
    fn distant_runner_up_is_not_ambiguous() {
        let route = Router::default().decide(&[scored("a", 0.9), scored("b", 0.6)], None);
        assert!(matches!(route, Route::Confident(_)));
    }

    #[test]
    fn low_candidates_are_never_ambiguous() {
        let route = Router::default().decide(&[scored("a", 0.3), scored("b", 0.25)], None);
        assert!(matches!(route, Route::Fallback));
    }

    #[test]
    fn follow_up_beats_weaker_primary() {
        let route = Router::default().decide(&[scored("time", 0.5)], Some(follow_up(0.7)));
        assert!(matches!(route, Route::FollowUp(_)));
    }

    #[test]
    fn high_primary_beats_follow_up() {
        let route = Router::default().decide(&[scored("time", 0.7)], Some(follow_up(0.7)));
        assert!(matches!(route, Route::Confident(_)));
    }

    #[test]
    fn follow_up_must_exceed_primary() {
        let route = Router::default().decide(&[scored("time", 0.55)], Some(follow_up(0.55)));
        assert!(matches!(route, Route::Hedged(_)));
    }
}
