//! End-to-end dialogue scenarios.
//!
//! These tests run whole conversations through the lexicon analyzer and the
//! dialogue engine: routing by confidence, slot filling, follow-ups and
//! context expiry.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use serde_json::{Value, json};

use colloquy_config::EngineConfig;
use colloquy_core::behavior::{FnFulfiller, Fulfillment, Params};
use colloquy_core::error::FulfillmentError;
use colloquy_core::intent::{
    Condition, EntityType, FollowUp, IntentDefinition, Matcher, OutputContext, ParameterSpec,
};
use colloquy_core::response::Response;
use colloquy_core::signal::{SignalBundle, SignalFlag};
use colloquy_engine::{DialogueEngine, IntentRegistry, Scorer, Session, TurnOutcome};
use colloquy_signals::LexiconAnalyzer;

// ── Fixtures ─────────────────────────────────────────────────────────────

fn text_of(p: &Params, key: &str) -> String {
    match p.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn time_intent() -> IntentDefinition {
    IntentDefinition::new("time")
        .with_label("the time")
        .require(Matcher::nouns(["time", "clock"]))
        .boost(Condition::flag(SignalFlag::IsQuestion), 0.2)
        .boost(Condition::flag(SignalFlag::IsCommand), 0.1)
        .with_fulfiller(FnFulfiller::new(|_: &Params| Ok(Fulfillment::text("It is 10:00."))))
}

fn weather_intent(calls: Arc<AtomicUsize>) -> IntentDefinition {
    IntentDefinition::new("weather")
        .with_label("the weather")
        .require(Matcher::nouns(["weather", "forecast"]))
        .boost(Condition::flag(SignalFlag::IsQuestion), 0.2)
        .with_parameter(ParameterSpec::new("location", EntityType::Place).required("Which city?"))
        .with_parameter(ParameterSpec::new("date", EntityType::Date).with_default("today"))
        .with_output_context(OutputContext::new("weather-followup", 2))
        .with_follow_up(FollowUp::new(
            "change-date",
            "weather-followup",
            ["tomorrow", "today"],
        ))
        .with_fulfiller(FnFulfiller::new(move |p: &Params| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Fulfillment::text(format!(
                "Sunny in {} {}.",
                text_of(p, "location"),
                text_of(p, "date")
            )))
        }))
}

fn alarm_intent() -> IntentDefinition {
    IntentDefinition::new("alarm")
        .with_label("an alarm")
        .require(Matcher::nouns(["alarm", "wake"]))
        .boost(Condition::Terms(Matcher::verbs(["set"])), 0.22)
        .with_fulfiller(FnFulfiller::new(|_: &Params| Ok(Fulfillment::text("Alarm set."))))
}

fn timer_intent() -> IntentDefinition {
    IntentDefinition::new("timer")
        .with_label("a timer")
        .require(Matcher::nouns(["timer", "alarm"]))
        .boost(Condition::Terms(Matcher::verbs(["set"])), 0.15)
        .with_fulfiller(FnFulfiller::new(|_: &Params| Ok(Fulfillment::text("Timer started."))))
}

fn booking_intent() -> IntentDefinition {
    IntentDefinition::new("booking")
        .with_label("a table booking")
        .require(Matcher::verbs(["book"]))
        .boost(Condition::flag(SignalFlag::IsCommand), 0.2)
        .with_parameter(
            ParameterSpec::new("guests", EntityType::Number)
                .required("How many guests?")
                .with_validator(|v: &Value| match v.as_f64() {
                    Some(n) if (1.0..=8.0).contains(&n) => Ok(()),
                    _ => Err("We can seat between 1 and 8 guests. How many?".to_string()),
                }),
        )
        .with_fulfiller(FnFulfiller::new(|p: &Params| {
            Ok(Fulfillment::text(format!("Table for {}.", text_of(p, "guests"))))
        }))
}

struct Harness {
    engine: DialogueEngine,
    session: Session,
    weather_calls: Arc<AtomicUsize>,
}

impl Harness {
    fn new() -> Self {
        let weather_calls = Arc::new(AtomicUsize::new(0));
        let mut registry = IntentRegistry::new();
        registry.register(time_intent()).unwrap();
        registry.register(weather_intent(Arc::clone(&weather_calls))).unwrap();
        registry.register(alarm_intent()).unwrap();
        registry.register(timer_intent()).unwrap();
        registry.register(booking_intent()).unwrap();
        Self::with_registry(registry, weather_calls)
    }

    fn with_registry(registry: IntentRegistry, weather_calls: Arc<AtomicUsize>) -> Self {
        let analyzer = LexiconAnalyzer::default()
            .with_reference_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        let engine =
            DialogueEngine::new(Arc::new(registry), Arc::new(analyzer), EngineConfig::default())
                .unwrap();
        let session = engine.new_session();
        Self {
            engine,
            session,
            weather_calls,
        }
    }

    async fn say(&mut self, utterance: &str) -> Response {
        self.engine.execute(&mut self.session, utterance).await.unwrap()
    }
}

// ── Routing by confidence ────────────────────────────────────────────────

#[tokio::test]
async fn high_confidence_answers_without_hedge() {
    let mut h = Harness::new();
    let response = h.say("What time is it?").await;

    assert_eq!(response.intent_id(), Some("time"));
    assert_eq!(response.text(), "It is 10:00.");
    assert!(!response.is_hedged());
    assert_eq!(h.session.last_turn().unwrap().outcome, TurnOutcome::Fulfilled);
}

#[tokio::test]
async fn medium_confidence_is_hedged() {
    let mut h = Harness::new();
    let response = h.say("Tell me the time").await;

    assert!(response.is_hedged());
    assert_eq!(response.text(), "I think it is 10:00.");
}

#[tokio::test]
async fn unmatched_question_and_statement_fall_back() {
    let config = EngineConfig::default();
    let mut h = Harness::new();

    let response = h.say("Where is the moon?").await;
    assert!(response.is_fallback());
    assert_eq!(response.text(), config.phrases.fallback_question);

    let response = h.say("Blorp zibble").await;
    assert!(response.is_fallback());
    assert_eq!(response.text(), config.phrases.fallback_statement);

    assert_eq!(h.session.turns_completed(), 2);
    assert_eq!(h.session.last_turn().unwrap().outcome, TurnOutcome::Fallback);
}

#[tokio::test]
async fn close_candidates_are_disambiguated() {
    let mut h = Harness::new();
    let response = h.say("set an alarm").await;

    let Response::Disambiguation { text, choices } = &response else {
        panic!("expected disambiguation, got {response:?}");
    };
    assert_eq!(text, "Did you mean an alarm or a timer?");
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0].intent_id, "alarm");
    assert!((choices[0].confidence - 0.72).abs() < 1e-9);
    assert!((choices[1].confidence - 0.65).abs() < 1e-9);

    // Advisory only: nothing is pending and the next utterance is fresh.
    assert!(h.session.pending().is_none());
    let response = h.say("What time is it?").await;
    assert_eq!(response.intent_id(), Some("time"));
}

// ── Scoring properties ───────────────────────────────────────────────────

#[test]
fn scores_stay_within_bounds() {
    let scorer = Scorer::default();
    let eager = IntentDefinition::new("eager")
        .require(Matcher::nouns(["x"]))
        .boost(Condition::flag(SignalFlag::IsQuestion), 0.9)
        .boost(Condition::Terms(Matcher::nouns(["x"])), 0.9);
    let gloomy = IntentDefinition::new("gloomy")
        .require(Matcher::nouns(["x"]))
        .penalize(Matcher::nouns(["x"]), 0.4)
        .penalize(Matcher::nouns(["y"]), 0.4);

    let bundles = [
        SignalBundle::new("x?").with_nouns(["x"]).with_flag(SignalFlag::IsQuestion),
        SignalBundle::new("x y").with_nouns(["x", "y"]),
        SignalBundle::new("z").with_nouns(["z"]),
    ];
    for bundle in &bundles {
        for intent in [&eager, &gloomy] {
            let score = scorer.score(intent, bundle);
            assert!((0.0..=1.0).contains(&score), "{} scored {score}", intent.id);
        }
    }
    assert!((scorer.score(&eager, &bundles[0]) - 1.0).abs() < 1e-9);
    assert_eq!(scorer.score(&gloomy, &bundles[1]), 0.0);
}

#[test]
fn penalties_accumulate() {
    let scorer = Scorer::default();
    let intent = IntentDefinition::new("news")
        .require(Matcher::nouns(["news"]))
        .penalize(Matcher::nouns(["weather"]), 0.2)
        .penalize(Matcher::nouns(["sport"]), 0.2);
    let bundle = SignalBundle::new("news weather sport").with_nouns(["news", "weather", "sport"]);
    assert!((scorer.score(&intent, &bundle) - 0.1).abs() < 1e-9);
}

// ── Slot filling and follow-ups ──────────────────────────────────────────

#[tokio::test]
async fn weather_in_paris_then_tomorrow() {
    let mut h = Harness::new();

    let response = h.say("What's the weather?").await;
    assert_eq!(response.awaiting_input(), Some("location"));
    assert_eq!(response.text(), "Which city?");

    // Nothing is committed while a parameter is pending.
    assert_eq!(h.session.turns_completed(), 0);
    assert!(h.session.history().is_empty());
    assert!(h.session.active_contexts().is_empty());
    assert_eq!(h.weather_calls.load(Ordering::SeqCst), 0);

    let response = h.say("in Paris").await;
    assert_eq!(response.text(), "Sunny in Paris today.");
    assert!(!response.is_follow_up());
    assert_eq!(h.weather_calls.load(Ordering::SeqCst), 1);

    let last = h.session.last_turn().unwrap();
    assert_eq!(last.input, "What's the weather?");
    assert_eq!(last.outcome, TurnOutcome::Fulfilled);
    assert_eq!(
        h.session.context("weather-followup").unwrap()["location"],
        json!("Paris")
    );

    let response = h.say("And tomorrow?").await;
    assert!(response.is_follow_up());
    assert_eq!(response.text(), "Sunny in Paris 2026-10-18.");
    assert_eq!(h.session.last_turn().unwrap().outcome, TurnOutcome::FollowUp);
}

#[tokio::test]
async fn unanswered_prompt_is_asked_again() {
    let mut h = Harness::new();
    h.say("What's the weather?").await;

    let response = h.say("no idea").await;
    assert_eq!(response.awaiting_input(), Some("location"));
    assert_eq!(response.text(), "Which city?");
    assert_eq!(h.session.turns_completed(), 0);
}

#[tokio::test]
async fn hedge_survives_slot_filling() {
    let mut h = Harness::new();

    // A command, not a question: the weather intent only reaches medium.
    let response = h.say("Tell me the weather").await;
    assert_eq!(response.awaiting_input(), Some("location"));

    let response = h.say("in Paris").await;
    assert!(response.is_hedged());
    assert_eq!(response.text(), "I think sunny in Paris today.");
}

#[tokio::test]
async fn rejected_answer_leaves_collected_params_alone() {
    let mut h = Harness::new();

    let response = h.say("book a table").await;
    assert_eq!(response.awaiting_input(), Some("guests"));
    let before = h.session.pending().unwrap().collected.clone();

    let response = h.say("20").await;
    assert_eq!(response.awaiting_input(), Some("guests"));
    assert_eq!(response.text(), "We can seat between 1 and 8 guests. How many?");
    assert_eq!(h.session.pending().unwrap().collected, before);
    assert_eq!(h.session.turns_completed(), 0);

    let response = h.say("4").await;
    assert_eq!(response.text(), "Table for 4.");
    assert!(h.session.pending().is_none());
}

#[tokio::test]
async fn invalid_value_in_request_prompts_with_validator_message() {
    let mut h = Harness::new();

    let response = h.say("book a table for 20").await;
    assert_eq!(response.awaiting_input(), Some("guests"));
    assert_eq!(response.text(), "We can seat between 1 and 8 guests. How many?");
    assert!(h.session.pending().unwrap().collected.get("guests").is_none());

    // A missing answer falls back to the declared prompt.
    let response = h.say("no idea").await;
    assert_eq!(response.text(), "How many guests?");

    let response = h.say("6").await;
    assert_eq!(response.text(), "Table for 6.");
}

#[tokio::test]
async fn cancelling_returns_to_idle() {
    let mut h = Harness::new();
    h.say("book a table").await;

    let cancelled = h.session.cancel_pending().unwrap();
    assert_eq!(cancelled.intent_id, "booking");

    // "4" is a fresh utterance now, and matches nothing.
    let response = h.say("4").await;
    assert!(response.is_fallback());
}

// ── Context expiry ───────────────────────────────────────────────────────

#[tokio::test]
async fn context_lives_for_its_lifespan() {
    let mut h = Harness::new();
    h.say("What's the weather in Paris?").await;
    h.say("Blorp zibble").await;

    // Written with lifespan 2: still active one unrelated turn later.
    assert!(h.session.active_contexts().contains(&"weather-followup".to_string()));
    let response = h.say("And tomorrow?").await;
    assert!(response.is_follow_up());
}

#[tokio::test]
async fn prompts_do_not_age_contexts() {
    let mut h = Harness::new();
    h.say("What's the weather in Paris?").await;
    let remaining = |h: &Harness| {
        h.session
            .context_entries()
            .iter()
            .find(|e| e.name == "weather-followup")
            .map(|e| e.remaining_turns)
    };
    assert_eq!(remaining(&h), Some(2));

    // A prompt and a re-prompt are not completed turns.
    let response = h.say("book a table").await;
    assert_eq!(response.awaiting_input(), Some("guests"));
    let response = h.say("20").await;
    assert_eq!(response.awaiting_input(), Some("guests"));
    assert_eq!(remaining(&h), Some(2));
    assert_eq!(h.session.turns_completed(), 1);

    // Completing the booking is one turn.
    let response = h.say("4").await;
    assert_eq!(response.text(), "Table for 4.");
    assert_eq!(h.session.turns_completed(), 2);
    assert_eq!(h.session.active_contexts(), vec!["weather-followup".to_string()]);

    let response = h.say("And tomorrow?").await;
    assert!(response.is_follow_up());
    assert_eq!(response.text(), "Sunny in Paris 2026-10-18.");
}

#[tokio::test]
async fn expired_context_disables_follow_up() {
    let mut h = Harness::new();
    h.say("What's the weather in Paris?").await;
    h.say("Blorp zibble").await;
    h.say("Blorp zibble").await;

    assert!(h.session.context("weather-followup").is_none());
    let response = h.say("And tomorrow?").await;
    assert!(response.is_fallback());
}

#[tokio::test]
async fn no_follow_up_without_context() {
    let mut h = Harness::new();
    let response = h.say("And tomorrow?").await;
    assert!(response.is_fallback());
    assert_eq!(h.weather_calls.load(Ordering::SeqCst), 0);
}

// ── Fulfillment failures ─────────────────────────────────────────────────

#[tokio::test]
async fn failure_after_collection_apologises_and_resets() {
    let order = IntentDefinition::new("order")
        .require(Matcher::nouns(["pizza"]))
        .boost(Condition::Terms(Matcher::nouns(["order"])), 0.2)
        .with_parameter(ParameterSpec::new("count", EntityType::Number).required("How many?"))
        .with_output_context(OutputContext::new("order-followup", 3))
        .with_fulfiller(FnFulfiller::new(|_: &Params| {
            Err(FulfillmentError::new("kitchen closed"))
        }));
    let mut registry = IntentRegistry::new();
    registry.register(order).unwrap();
    let mut h = Harness::with_registry(registry, Arc::new(AtomicUsize::new(0)));

    let response = h.say("order a pizza").await;
    assert_eq!(response.awaiting_input(), Some("count"));

    let response = h.say("2").await;
    assert!(matches!(response, Response::Apology { .. }));
    assert_eq!(response.text(), EngineConfig::default().phrases.apology);

    assert!(h.session.pending().is_none());
    assert!(h.session.active_contexts().is_empty());
    let last = h.session.last_turn().unwrap();
    assert_eq!(last.outcome, TurnOutcome::Failed);
    assert_eq!(last.input, "order a pizza");
}
