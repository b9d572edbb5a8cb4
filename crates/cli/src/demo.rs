//! Demo intents: the shipped manifest plus the code bound to it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Local;
use serde_json::{Value, json};

use colloquy_core::behavior::{FnFulfiller, Fulfiller, Fulfillment, Params};
use colloquy_core::error::FulfillmentError;
use colloquy_core::intent::IntentDefinition;
use colloquy_core::signal::{EntityKind, SignalBundle};
use colloquy_engine::{IntentManifest, IntentRegistry, ManifestError};

pub const DEMO_MANIFEST: &str = include_str!("../intents/demo.toml");

/// Parse the demo manifest and bind its behaviour.
pub fn registry() -> Result<IntentRegistry, ManifestError> {
    let manifest = IntentManifest::from_toml(DEMO_MANIFEST)?;
    let book = Arc::new(ReminderBook::default());
    let mut registry = IntentRegistry::new();
    manifest.register_into(&mut registry, |def| bind(def, &book))?;
    Ok(registry)
}

fn bind(def: IntentDefinition, book: &Arc<ReminderBook>) -> IntentDefinition {
    let id = def.id.clone();
    match id.as_str() {
        "time" => def.with_fulfiller(FnFulfiller::new(tell_time)),
        "weather" => def
            .map_parameter("location", |p| p.with_extractor(extract_location))
            .with_fulfiller(FnFulfiller::new(forecast)),
        "news" => def.with_fulfiller(FnFulfiller::new(headlines)),
        "reminder" => def
            .map_parameter("task", |p| p.with_extractor(extract_task).with_validator(validate_task))
            .map_parameter("date", |p| p.with_default_producer(today))
            .with_fulfiller(ReminderFulfiller {
                book: Arc::clone(book),
            }),
        _ => def,
    }
}

// ── Time ──

fn tell_time(_params: &Params) -> Result<Fulfillment, FulfillmentError> {
    let now = Local::now();
    Ok(Fulfillment::text(format!("It is {}.", now.format("%H:%M")))
        .with_data(json!({ "time": now.format("%H:%M").to_string() })))
}

// ── Weather ──

const CONDITIONS: &[&str] = &["sunny", "cloudy", "rainy", "windy", "foggy"];

/// A canned forecast, stable for a given place and day.
fn forecast(params: &Params) -> Result<Fulfillment, FulfillmentError> {
    let location = params
        .get("location")
        .and_then(Value::as_str)
        .ok_or_else(|| FulfillmentError::new("no location"))?;
    let date = params.get("date").and_then(Value::as_str).unwrap_or("today");

    let seed: u32 = location.bytes().chain(date.bytes()).map(u32::from).sum();
    let condition = CONDITIONS[seed as usize % CONDITIONS.len()];
    let temperature = 8 + (seed % 19) as i64;

    let when = match date {
        "today" | "tonight" | "tomorrow" => date.to_string(),
        other => format!("on {other}"),
    };
    Ok(Fulfillment::text(format!(
        "It looks {condition} in {location} {when}, around {temperature}°C."
    ))
    .with_data(json!({ "forecast": condition, "temperature_c": temperature })))
}

/// The first place entity. A short reply made of plain words only ("paris",
/// "new york") is read as the place itself.
fn extract_location(bundle: &SignalBundle) -> Option<Value> {
    if let Some(place) = bundle.first_entity(EntityKind::Place) {
        return Some(place.resolved());
    }
    let asks_again = ["weather", "forecast", "temperature"]
        .iter()
        .any(|n| bundle.has_noun(n))
        || WEATHER_WORDS.iter().any(|a| bundle.has_adjective(a));
    let plain = bundle.entities.is_empty() && bundle.verbs.is_empty() && !bundle.flags.is_question;
    if asks_again || !plain || bundle.word_count == 0 || bundle.word_count > 3 {
        return None;
    }
    let name: Vec<String> = bundle.normalized.split_whitespace().map(capitalize).collect();
    Some(Value::String(name.join(" ")))
}

const WEATHER_WORDS: &[&str] = &["sunny", "rainy", "cloudy", "cold", "hot", "warm", "windy"];

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── News ──

fn headlines(_params: &Params) -> Result<Fulfillment, FulfillmentError> {
    let items = [
        "Local library extends weekend opening hours",
        "City council approves new cycling lanes",
        "Rust 2024 edition sees wide adoption",
    ];
    Ok(Fulfillment::text(format!("Here are the headlines: {}.", items.join("; ")))
        .with_data(json!({ "count": items.len() })))
}

// ── Reminders ──

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub task: String,
    pub time: String,
    pub date: String,
}

/// In-memory reminder storage shared by the reminder fulfiller.
#[derive(Debug, Default)]
pub struct ReminderBook {
    reminders: Mutex<Vec<Reminder>>,
}

impl ReminderBook {
    /// Add a reminder, or move an existing one with the same task.
    /// Returns true when an existing reminder was moved.
    fn upsert(&self, reminder: Reminder) -> Result<bool, FulfillmentError> {
        let mut reminders = self
            .reminders
            .lock()
            .map_err(|_| FulfillmentError::new("reminder storage is unavailable"))?;
        if let Some(existing) = reminders.iter_mut().find(|r| r.task == reminder.task) {
            *existing = reminder;
            return Ok(true);
        }
        reminders.push(reminder);
        Ok(false)
    }

    pub fn len(&self) -> usize {
        self.reminders.lock().map(|r| r.len()).unwrap_or(0)
    }
}

struct ReminderFulfiller {
    book: Arc<ReminderBook>,
}

#[async_trait]
impl Fulfiller for ReminderFulfiller {
    async fn fulfill(&self, params: &Params) -> Result<Fulfillment, FulfillmentError> {
        let field = |name: &str| {
            params
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| FulfillmentError::new(format!("missing {name}")))
        };
        let reminder = Reminder {
            task: field("task")?,
            time: field("time")?,
            date: field("date")?,
        };
        let moved = self.book.upsert(reminder.clone())?;
        let verb = if moved { "Moved" } else { "Done" };
        Ok(Fulfillment::text(format!(
            "{verb}: I'll remind you to {} at {} on {}.",
            reminder.task, reminder.time, reminder.date
        ))
        .with_data(json!({ "reminders": self.book.len() })))
    }
}

/// Phrases that end the task part of "remind me to ...".
const TASK_STOPS: &[&str] = &[" at ", " on ", " tomorrow", " today", " tonight", " by ", " in "];

/// The task of a reminder request: the words after "to". An answer to the
/// task prompt is taken whole.
fn extract_task(bundle: &SignalBundle) -> Option<Value> {
    let text = bundle.normalized.as_str();
    let is_request =
        bundle.has_verb("remind") || bundle.has_verb("remember") || bundle.has_noun("reminder");

    let task = if is_request {
        let (_, rest) = text.split_once(" to ")?;
        rest
    } else {
        text
    };

    let padded = format!("{task} ");
    let end = TASK_STOPS
        .iter()
        .filter_map(|stop| padded.find(stop))
        .min()
        .unwrap_or(task.len())
        .min(task.len());
    let task = task[..end].trim();
    (!task.is_empty()).then(|| Value::String(task.to_string()))
}

fn validate_task(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(task) if task.chars().count() >= 3 => Ok(()),
        _ => Err("That is a bit short. What should I remind you about?".to_string()),
    }
}

/// Today's date, evaluated when the default is needed.
fn today() -> Value {
    Value::String(Local::now().date_naive().format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_signals::LexiconAnalyzer;

    fn bundle(text: &str) -> SignalBundle {
        LexiconAnalyzer::default().analyze_text(text, &[])
    }

    #[test]
    fn demo_manifest_registers() {
        let registry = registry().unwrap();
        assert_eq!(registry.ids(), vec!["time", "weather", "news", "reminder"]);
        assert!(registry.check_follow_up_targets().is_ok());
    }

    #[test]
    fn task_from_request_and_answer() {
        assert_eq!(
            extract_task(&bundle("Remind me to buy milk at 7pm")),
            Some(json!("buy milk"))
        );
        assert_eq!(
            extract_task(&bundle("remind me to call mum tomorrow")),
            Some(json!("call mum"))
        );
        assert_eq!(extract_task(&bundle("remind me at 7pm")), None);
        assert_eq!(extract_task(&bundle("water the plants")), Some(json!("water the plants")));
    }

    #[test]
    fn location_from_entity_or_bare_reply() {
        assert_eq!(extract_location(&bundle("weather in Paris")), Some(json!("Paris")));
        assert_eq!(extract_location(&bundle("new york")), Some(json!("New York")));
        assert_eq!(extract_location(&bundle("What's the weather?")), None);
        assert_eq!(extract_location(&bundle("and tomorrow")), None);
        assert_eq!(extract_location(&bundle("sunny")), None);
    }

    #[test]
    fn short_tasks_rejected() {
        assert!(validate_task(&json!("go")).is_err());
        assert!(validate_task(&json!("go running")).is_ok());
    }

    #[test]
    fn forecast_is_stable() {
        let mut params = Params::new();
        params.insert("location".into(), json!("Paris"));
        params.insert("date".into(), json!("tomorrow"));
        let a = forecast(&params).unwrap();
        let b = forecast(&params).unwrap();
        assert_eq!(a, b);
        assert!(a.text.contains("Paris tomorrow"));
    }

    #[tokio::test]
    async fn moving_a_reminder_replaces_it() {
        let book = Arc::new(ReminderBook::default());
        let fulfiller = ReminderFulfiller {
            book: Arc::clone(&book),
        };
        let mut params = Params::new();
        params.insert("task".into(), json!("buy milk"));
        params.insert("time".into(), json!("19:00"));
        params.insert("date".into(), json!("2026-10-17"));
        fulfiller.fulfill(&params).await.unwrap();

        params.insert("time".into(), json!("20:00"));
        let moved = fulfiller.fulfill(&params).await.unwrap();
        assert!(moved.text.starts_with("Moved"));
        assert_eq!(book.len(), 1);
    }
}
