//! Dialogue Orchestrator — one utterance in, one [`Response`] out.
//!
//! ```text
//!                 ┌──────────── answer accepted, nothing missing ──────────┐
//!                 ▼                                                         │
//!  Idle ── utterance ── route ──► fulfill / fallback / disambiguate        │
//!   │                     │                                                 │
//!   │                     └── required parameter missing ──► Awaiting(param)┘
//!   │                                                          │  ▲
//!   └──────────────────────────────────────────────────────────┘  └─ invalid / no answer
//! ```
//!
//! The engine itself is immutable and shared; all conversation state lives in
//! the [`Session`] passed to [`DialogueEngine::execute`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use colloquy_config::EngineConfig;
use colloquy_core::analyzer::SignalAnalyzer;
use colloquy_core::behavior::{Fulfillment, Params};
use colloquy_core::error::{EngineError, RegistrationError, Result};
use colloquy_core::event::{DialogueEvent, EventBus};
use colloquy_core::intent::{IntentDefinition, OutputContext};
use colloquy_core::response::{Choice, Response};
use colloquy_core::signal::SignalBundle;

use crate::follow_up::{FollowUpMatch, FollowUpResolver};
use crate::history::{TurnOutcome, TurnRecord};
use crate::parameters::{self, AnswerError};
use crate::registry::IntentRegistry;
use crate::routing::{Route, Router};
use crate::scoring::{ScoredIntent, Scorer};
use crate::session::{PendingCollection, Session};

/// How the intent being collected or fulfilled was reached.
struct Origin {
    input: String,
    hedged: bool,
    follow_up: bool,
    /// Validator messages for values the utterance supplied but failed validation.
    rejected: HashMap<String, String>,
}

/// The dialogue engine.
pub struct DialogueEngine {
    registry: Arc<IntentRegistry>,
    analyzer: Arc<dyn SignalAnalyzer>,
    config: EngineConfig,
    scorer: Scorer,
    resolver: FollowUpResolver,
    router: Router,
    event_bus: Option<Arc<EventBus>>,
}

impl DialogueEngine {
    /// Build an engine over a filled registry. Fails if a follow-up reuses an
    /// intent that is not registered.
    pub fn new(
        registry: Arc<IntentRegistry>,
        analyzer: Arc<dyn SignalAnalyzer>,
        config: EngineConfig,
    ) -> Result<Self> {
        registry.check_follow_up_targets()?;
        Ok(Self {
            scorer: Scorer::new(&config.scoring),
            resolver: FollowUpResolver::new(config.follow_up.clone()),
            router: Router::new(config.thresholds.clone()),
            registry,
            analyzer,
            config,
            event_bus: None,
        })
    }

    /// Publish dialogue events on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// A fresh conversation, with the configured history bound.
    pub fn new_session(&self) -> Session {
        Session::new(self.config.history.limit)
    }

    /// Registered intent ids, in registration order.
    pub fn intent_ids(&self) -> Vec<&str> {
        self.registry.ids()
    }

    pub fn registry(&self) -> &IntentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one utterance for `session`.
    ///
    /// Analyzer failures and broken definitions are returned as errors. Every
    /// other outcome, including a failing fulfiller, is a [`Response`].
    pub async fn execute(&self, session: &mut Session, utterance: &str) -> Result<Response> {
        let active = session.active_contexts();
        let mut bundle = self.analyzer.analyze(utterance, &active).await?;
        if bundle.active_contexts.is_empty() {
            bundle.active_contexts = active.iter().cloned().collect();
        }
        debug!(
            session = %session.id(),
            words = bundle.word_count,
            contexts = active.len(),
            "Analyzed utterance"
        );

        if let Some(pending) = session.take_pending() {
            return self.continue_collection(session, pending, &bundle).await;
        }

        let ranked = self.scorer.rank(&self.registry, &bundle);
        let follow_up = self.resolver.resolve(&self.registry, &bundle, &active);

        match self.router.decide(&ranked, follow_up) {
            Route::FollowUp(found) => self.run_follow_up(session, utterance, &bundle, found).await,
            Route::Ambiguous(candidates) => Ok(self.disambiguate(session, utterance, &candidates)),
            Route::Confident(top) => self.start(session, utterance, top, &bundle, false).await,
            Route::Hedged(top) => self.start(session, utterance, top, &bundle, true).await,
            Route::Fallback => Ok(self.fall_back(session, utterance, &bundle)),
        }
    }

    // ── Routing outcomes ──

    async fn start(
        &self,
        session: &mut Session,
        utterance: &str,
        top: ScoredIntent,
        bundle: &SignalBundle,
        hedged: bool,
    ) -> Result<Response> {
        let params = parameters::extract_all(&top.intent, bundle);
        let rejected = top
            .intent
            .parameters
            .iter()
            .filter_map(|spec| Some((spec.name.clone(), parameters::rejection(spec, bundle)?)))
            .collect();
        debug!(intent = %top.id(), score = top.score, hedged, "Selected intent");
        let origin = Origin {
            input: utterance.to_string(),
            hedged,
            follow_up: false,
            rejected,
        };
        self.proceed(session, top.intent, params, origin).await
    }

    async fn run_follow_up(
        &self,
        session: &mut Session,
        utterance: &str,
        bundle: &SignalBundle,
        found: FollowUpMatch,
    ) -> Result<Response> {
        let target = self.intent(&found.target_id)?;
        let data = session
            .context(&found.context_name)
            .cloned()
            .unwrap_or(Value::Null);

        let mut params = match &found.follow_up.modifier {
            Some(modifier) => modifier.modify(&data, bundle),
            None => {
                let mut seeded = seed_from_context(&target, &data);
                parameters::overlay(&target, bundle, &mut seeded);
                seeded
            }
        };
        parameters::apply_defaults(&target, &mut params);

        info!(
            session = %session.id(),
            follow_up = %found.follow_up.name,
            context = %found.context_name,
            intent = %target.id,
            score = found.score,
            "Resolved follow-up"
        );
        let origin = Origin {
            input: utterance.to_string(),
            hedged: false,
            follow_up: true,
            rejected: HashMap::new(),
        };
        self.proceed(session, target, params, origin).await
    }

    fn disambiguate(
        &self,
        session: &mut Session,
        utterance: &str,
        candidates: &[ScoredIntent],
    ) -> Response {
        let choices: Vec<Choice> = candidates
            .iter()
            .map(|c| Choice {
                label: c.intent.label.clone(),
                intent_id: c.intent.id.clone(),
                confidence: c.score,
            })
            .collect();
        let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
        let text = format!("{} {}?", self.config.phrases.disambiguation, join_choices(&labels));

        let record = TurnRecord::new(utterance, None, TurnOutcome::Disambiguation, &text);
        self.finish_turn(session, record, Vec::new());
        Response::Disambiguation { text, choices }
    }

    fn fall_back(&self, session: &mut Session, utterance: &str, bundle: &SignalBundle) -> Response {
        let phrases = &self.config.phrases;
        let text = if bundle.flags.is_question {
            phrases.fallback_question.clone()
        } else {
            phrases.fallback_statement.clone()
        };
        debug!(session = %session.id(), question = bundle.flags.is_question, "No intent matched");

        let record = TurnRecord::new(utterance, None, TurnOutcome::Fallback, &text);
        self.finish_turn(session, record, Vec::new());
        Response::Fallback { text }
    }

    // ── Slot filling ──

    async fn continue_collection(
        &self,
        session: &mut Session,
        mut pending: PendingCollection,
        bundle: &SignalBundle,
    ) -> Result<Response> {
        let intent = self.intent(&pending.intent_id)?;
        let spec = intent
            .parameter(&pending.awaiting)
            .ok_or_else(|| EngineError::UnknownParameter {
                intent: intent.id.clone(),
                param: pending.awaiting.clone(),
            })?;

        match parameters::answer(spec, bundle) {
            Ok(value) => {
                debug!(intent = %intent.id, param = %spec.name, "Parameter collected");
                pending.collected.insert(spec.name.clone(), value);
            }
            Err(AnswerError::Missing) => {
                let text = spec.prompt.clone();
                return Ok(self.prompt(session, pending, text));
            }
            Err(AnswerError::Invalid(message)) => {
                warn!(intent = %intent.id, param = %spec.name, %message, "Answer rejected");
                self.emit(DialogueEvent::ValidationRejected {
                    session_id: session.id().to_string(),
                    intent_id: intent.id.clone(),
                    param: spec.name.clone(),
                    message: message.clone(),
                    timestamp: Utc::now(),
                });
                return Ok(self.prompt(session, pending, message));
            }
        }

        let origin = Origin {
            input: pending.original_input,
            hedged: pending.hedged,
            follow_up: pending.follow_up,
            rejected: HashMap::new(),
        };
        self.proceed(session, intent, pending.collected, origin).await
    }

    /// Prompt for the next missing parameter, or fulfill when none is left.
    async fn proceed(
        &self,
        session: &mut Session,
        intent: Arc<IntentDefinition>,
        params: Params,
        origin: Origin,
    ) -> Result<Response> {
        if let Some(spec) = parameters::next_missing(&intent, &params) {
            let text = match origin.rejected.get(&spec.name) {
                Some(message) => {
                    self.emit(DialogueEvent::ValidationRejected {
                        session_id: session.id().to_string(),
                        intent_id: intent.id.clone(),
                        param: spec.name.clone(),
                        message: message.clone(),
                        timestamp: Utc::now(),
                    });
                    message.clone()
                }
                None => spec.prompt.clone(),
            };
            let pending = PendingCollection {
                intent_id: intent.id.clone(),
                collected: params,
                awaiting: spec.name.clone(),
                original_input: origin.input,
                hedged: origin.hedged,
                follow_up: origin.follow_up,
            };
            return Ok(self.prompt(session, pending, text));
        }
        self.fulfill(session, &intent, params, origin).await
    }

    fn prompt(&self, session: &mut Session, pending: PendingCollection, text: String) -> Response {
        debug!(
            session = %session.id(),
            intent = %pending.intent_id,
            param = %pending.awaiting,
            "Awaiting parameter"
        );
        self.emit(DialogueEvent::ParameterRequested {
            session_id: session.id().to_string(),
            intent_id: pending.intent_id.clone(),
            param: pending.awaiting.clone(),
            timestamp: Utc::now(),
        });
        let response = Response::Prompt {
            intent_id: pending.intent_id.clone(),
            text,
            awaiting_input: pending.awaiting.clone(),
        };
        session.set_pending(pending);
        response
    }

    // ── Fulfillment ──

    async fn fulfill(
        &self,
        session: &mut Session,
        intent: &IntentDefinition,
        params: Params,
        origin: Origin,
    ) -> Result<Response> {
        let fulfiller = intent
            .fulfiller
            .as_ref()
            .ok_or_else(|| RegistrationError::MissingFulfiller(intent.id.clone()))?;

        match fulfiller.fulfill(&params).await {
            Ok(result) => {
                let outputs = intent
                    .output_contexts
                    .iter()
                    .map(|ctx| (ctx.name.clone(), derive_context(ctx, &result, &params), ctx.lifespan))
                    .collect();

                let text = if origin.hedged {
                    self.hedge(session.turns_completed(), &result.text)
                } else {
                    result.text
                };
                let outcome = if origin.follow_up {
                    TurnOutcome::FollowUp
                } else {
                    TurnOutcome::Fulfilled
                };

                info!(
                    session = %session.id(),
                    intent = %intent.id,
                    hedged = origin.hedged,
                    follow_up = origin.follow_up,
                    "Intent fulfilled"
                );
                let record = TurnRecord::new(origin.input, Some(intent.id.clone()), outcome, &text);
                self.finish_turn(session, record, outputs);

                Ok(Response::Fulfilled {
                    intent_id: intent.id.clone(),
                    text,
                    data: result.data,
                    hedged: origin.hedged,
                    follow_up: origin.follow_up,
                })
            }
            Err(e) => {
                warn!(session = %session.id(), intent = %intent.id, error = %e, "Fulfillment failed");
                self.emit(DialogueEvent::FulfillmentFailed {
                    session_id: session.id().to_string(),
                    intent_id: intent.id.clone(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });

                let text = self.config.phrases.apology.clone();
                let record = TurnRecord::new(
                    origin.input,
                    Some(intent.id.clone()),
                    TurnOutcome::Failed,
                    &text,
                );
                self.finish_turn(session, record, Vec::new());
                Ok(Response::Apology {
                    intent_id: intent.id.clone(),
                    text,
                })
            }
        }
    }

    /// Record a completed turn, age contexts and write the turn's outputs.
    fn finish_turn(&self, session: &mut Session, record: TurnRecord, outputs: Vec<(String, Value, u32)>) {
        let intent_id = record.intent_id.clone();
        let outcome = record.outcome;
        let expired = session.complete_turn(record, outputs);

        if !expired.is_empty() {
            debug!(session = %session.id(), contexts = ?expired, "Contexts expired");
            self.emit(DialogueEvent::ContextsExpired {
                session_id: session.id().to_string(),
                names: expired,
                timestamp: Utc::now(),
            });
        }
        self.emit(DialogueEvent::TurnCompleted {
            session_id: session.id().to_string(),
            intent_id,
            outcome: outcome.as_str().to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Prefix a hedge phrase, rotating through the configured phrases.
    fn hedge(&self, turn: u64, text: &str) -> String {
        let hedges: Vec<&str> = self
            .config
            .phrases
            .hedges
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .collect();
        if hedges.is_empty() {
            return text.to_string();
        }
        let phrase = hedges[(turn % hedges.len() as u64) as usize];
        format!("{phrase} {}", lower_sentence_start(text))
    }

    fn intent(&self, id: &str) -> Result<Arc<IntentDefinition>> {
        self.registry
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownIntent(id.to_string()).into())
    }

    fn emit(&self, event: DialogueEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

/// Context data when no deriver is set: parameters, overlaid with the
/// fulfillment's data object.
fn derive_context(ctx: &OutputContext, result: &Fulfillment, params: &Params) -> Value {
    if let Some(deriver) = &ctx.deriver {
        return deriver.derive(result, params);
    }
    let mut data = params.clone();
    if let Some(Value::Object(extra)) = &result.data {
        for (k, v) in extra {
            data.insert(k.clone(), v.clone());
        }
    }
    Value::Object(data)
}

/// Seed follow-up parameters from the context entries named like the target's
/// parameters.
fn seed_from_context(target: &IntentDefinition, data: &Value) -> Params {
    let mut params = Params::new();
    if let Value::Object(map) = data {
        for spec in &target.parameters {
            if let Some(value) = map.get(&spec.name) {
                params.insert(spec.name.clone(), value.clone());
            }
        }
    }
    params
}

/// "A", "A or B", "A, B or C".
fn join_choices(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

/// Lower-case the first letter unless it starts an acronym or is a lone "I".
fn lower_sentence_start(text: &str) -> String {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let second_is_lower = chars.clone().next().is_some_and(char::is_lowercase);
    if first.is_uppercase() && second_is_lower {
        first.to_lowercase().chain(chars).collect()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use colloquy_core::behavior::FnFulfiller;
    use colloquy_core::error::{AnalysisError, Error, FulfillmentError};
    use colloquy_core::intent::{Condition, EntityType, FollowUp, Matcher, ParameterSpec};
    use colloquy_core::signal::{Entity, EntityKind, SignalFlag};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Builds bundles by hand: a few fixed words become nouns, verbs, entities
    /// and flags.
    struct ScriptedAnalyzer;

    #[async_trait]
    impl SignalAnalyzer for ScriptedAnalyzer {
        async fn analyze(
            &self,
            text: &str,
            active_contexts: &[String],
        ) -> std::result::Result<SignalBundle, AnalysisError> {
            if text == "!fail" {
                return Err(AnalysisError::Failed("scripted failure".into()));
            }
            let mut bundle = SignalBundle::new(text).with_active_contexts(active_contexts.iter().cloned());
            if text.ends_with('?') {
                bundle = bundle.with_flag(SignalFlag::IsQuestion);
            }
            for word in bundle.normalized.clone().split_whitespace() {
                let word = word.trim_matches(|c: char| !c.is_alphanumeric() && c != ':');
                match word {
                    "time" | "weather" | "reminder" | "news" => bundle = bundle.with_nouns([word]),
                    "tell" | "remind" => bundle = bundle.with_verbs([word]),
                    "tomorrow" | "today" => {
                        bundle = bundle.with_entity(Entity::new(EntityKind::Date, word))
                    }
                    "paris" | "london" => bundle = bundle.with_entity(Entity::new(EntityKind::Place, word)),
                    w if w.contains(':') => bundle = bundle.with_entity(Entity::new(EntityKind::Time, w)),
                    _ => {}
                }
            }
            Ok(bundle)
        }
    }

    fn time_intent() -> IntentDefinition {
        IntentDefinition::new("time")
            .with_label("the time")
            .require(Matcher::nouns(["time"]))
            .boost(Condition::flag(SignalFlag::IsQuestion), 0.2)
            .boost(Condition::Terms(Matcher::verbs(["tell"])), 0.1)
            .with_fulfiller(FnFulfiller::new(|_: &Params| Ok(Fulfillment::text("It is 10:00."))))
    }

    fn weather_intent() -> IntentDefinition {
        IntentDefinition::new("weather")
            .require(Matcher::nouns(["weather"]))
            .boost(Condition::flag(SignalFlag::IsQuestion), 0.2)
            .with_parameter(ParameterSpec::new("location", EntityType::Place).required("Where?"))
            .with_parameter(ParameterSpec::new("date", EntityType::Date).with_default("today"))
            .with_fulfiller(FnFulfiller::new(|p: &Params| {
                let loc = p.get("location").and_then(Value::as_str).unwrap_or("?");
                let date = p.get("date").and_then(Value::as_str).unwrap_or("?");
                Ok(Fulfillment::text(format!("Sunny in {loc} {date}.")))
            }))
            .with_output_context(OutputContext::new("weather-followup", 2))
            .with_follow_up(FollowUp::new("change-date", "weather-followup", ["tomorrow", "today"]))
    }

    fn engine_with(intents: Vec<IntentDefinition>) -> DialogueEngine {
        let mut registry = IntentRegistry::new();
        for intent in intents {
            registry.register(intent).unwrap();
        }
        DialogueEngine::new(Arc::new(registry), Arc::new(ScriptedAnalyzer), EngineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn high_confidence_fulfills_without_hedge() {
        let engine = engine_with(vec![time_intent()]);
        let mut session = engine.new_session();
        let response = engine.execute(&mut session, "What time is it?").await.unwrap();
        assert_eq!(response.text(), "It is 10:00.");
        assert!(!response.is_hedged());
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn medium_confidence_is_hedged() {
        let engine = engine_with(vec![time_intent()]);
        let mut session = engine.new_session();
        let response = engine.execute(&mut session, "tell me the time").await.unwrap();
        assert!(response.is_hedged());
        assert_eq!(response.text(), "I think it is 10:00.");
    }

    #[tokio::test]
    async fn fallback_phrasing_depends_on_question() {
        let engine = engine_with(vec![time_intent()]);
        let config = EngineConfig::default();
        let mut session = engine.new_session();

        let q = engine.execute(&mut session, "Who are you?").await.unwrap();
        assert!(q.is_fallback());
        assert_eq!(q.text(), config.phrases.fallback_question);

        let s = engine.execute(&mut session, "blah blah").await.unwrap();
        assert_eq!(s.text(), config.phrases.fallback_statement);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn analyzer_errors_propagate() {
        let engine = engine_with(vec![time_intent()]);
        let mut session = engine.new_session();
        let err = engine.execute(&mut session, "!fail").await.unwrap_err();
        assert!(matches!(err, Error::Analysis(_)));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn slot_filling_then_follow_up() {
        let engine = engine_with(vec![weather_intent()]);
        let mut session = engine.new_session();

        let prompt = engine.execute(&mut session, "What's the weather?").await.unwrap();
        assert_eq!(prompt.awaiting_input(), Some("location"));
        assert!(session.history().is_empty());
        assert!(session.active_contexts().is_empty());

        let done = engine.execute(&mut session, "paris").await.unwrap();
        assert_eq!(done.text(), "Sunny in paris today.");
        assert_eq!(session.context("weather-followup").unwrap()["location"], json!("paris"));
        assert_eq!(session.last_turn().unwrap().input, "What's the weather?");

        let next = engine.execute(&mut session, "And tomorrow?").await.unwrap();
        assert!(next.is_follow_up());
        assert_eq!(next.text(), "Sunny in paris tomorrow.");
    }

    #[tokio::test]
    async fn failing_fulfiller_apologizes_without_contexts() {
        let failing = IntentDefinition::new("weather")
            .require(Matcher::nouns(["weather"]))
            .boost(Condition::flag(SignalFlag::IsQuestion), 0.3)
            .with_fulfiller(FnFulfiller::new(|_: &Params| Err(FulfillmentError::new("backend down"))))
            .with_output_context(OutputContext::new("weather-followup", 2));
        let engine = engine_with(vec![failing]);
        let mut session = engine.new_session();

        let response = engine.execute(&mut session, "weather?").await.unwrap();
        assert!(matches!(response, Response::Apology { .. }));
        assert!(session.active_contexts().is_empty());
        assert_eq!(session.last_turn().unwrap().outcome, TurnOutcome::Failed);
    }

    #[tokio::test]
    async fn events_are_published() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let engine = engine_with(vec![time_intent()]).with_event_bus(Arc::clone(&bus));
        let mut session = engine.new_session();

        engine.execute(&mut session, "What time is it?").await.unwrap();
        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DialogueEvent::TurnCompleted { intent_id, outcome, .. } => {
                assert_eq!(intent_id.as_deref(), Some("time"));
                assert_eq!(outcome, "fulfilled");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_follow_up_target_rejected_at_build() {
        let mut registry = IntentRegistry::new();
        registry
            .register(time_intent().with_follow_up(FollowUp::new("x", "ctx", ["x"]).reusing("ghost")))
            .unwrap();
        let result = DialogueEngine::new(Arc::new(registry), Arc::new(ScriptedAnalyzer), EngineConfig::default());
        assert!(matches!(result, Err(Error::Engine(EngineError::UnknownFollowUpTarget { .. }))));
    }

    #[tokio::test]
    async fn fulfiller_runs_once_per_fulfilled_turn() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counted = IntentDefinition::new("time")
            .require(Matcher::nouns(["time"]))
            .boost(Condition::flag(SignalFlag::IsQuestion), 0.2)
            .with_fulfiller(FnFulfiller::new(move |_: &Params| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Fulfillment::text("now"))
            }));
        let engine = engine_with(vec![counted]);
        let mut session = engine.new_session();
        engine.execute(&mut session, "time?").await.unwrap();
        engine.execute(&mut session, "nothing here").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn choices_are_joined() {
        assert_eq!(join_choices(&["A"]), "A");
        assert_eq!(join_choices(&["A", "B"]), "A or B");
        assert_eq!(join_choices(&["A", "B", "C"]), "A, B or C");
    }

    #[test]
    fn sentence_start_lowering() {
        assert_eq!(lower_sentence_start("It is late."), "it is late.");
        assert_eq!(lower_sentence_start("NASA says hi"), "NASA says hi");
        assert_eq!(lower_sentence_start("I am here"), "I am here");
        assert_eq!(lower_sentence_start(""), "");
    }
}
