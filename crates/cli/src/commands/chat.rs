//! `colloquy chat` — interactive conversation.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use colloquy_core::event::{DialogueEvent, EventBus};
use colloquy_core::response::Response;
use colloquy_engine::Session;

use super::{build_engine, load_config};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let event_bus = Arc::new(EventBus::default());
    let engine = build_engine(config)?.with_event_bus(Arc::clone(&event_bus));
    let mut session = engine.new_session();

    let mut events = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          Colloquy — Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Intents:   {}", engine.intent_ids().join(", "));
    println!("  Session:   {}", session.id());
    println!();
    println!("  Try: \"What's the weather in Paris?\" then \"And tomorrow?\"");
    println!("  Commands: /contexts, /history, /cancel, /reset");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "exit" | "quit" => break,
            "/contexts" => show_contexts(&session),
            "/history" => show_history(&session),
            "/cancel" => match session.cancel_pending() {
                Some(pending) => println!("  (stopped collecting for '{}')", pending.intent_id),
                None => println!("  (nothing to cancel)"),
            },
            "/reset" => {
                session.reset();
                println!("  (conversation reset)");
            }
            utterance => match engine.execute(&mut session, utterance).await {
                Ok(response) => show_response(&response),
                Err(e) => eprintln!("  [Error] {e}"),
            },
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn show_response(response: &Response) {
    println!();
    for line in response.text().lines() {
        println!("  Bot > {line}");
    }
    if let Response::Disambiguation { choices, .. } = response {
        for choice in choices {
            println!("        - {} ({:.2})", choice.label, choice.confidence);
        }
    }
    println!();
}

fn show_contexts(session: &Session) {
    let entries = session.context_entries();
    if entries.is_empty() {
        println!("  (no active contexts)");
        return;
    }
    for entry in entries {
        println!(
            "  {} [{} turn(s) left] {}",
            entry.name, entry.remaining_turns, entry.data
        );
    }
}

fn show_history(session: &Session) {
    let history = session.history();
    if history.is_empty() {
        println!("  (no completed turns)");
        return;
    }
    for record in history {
        println!(
            "  {} {:<14} {:<10} \"{}\"",
            record.timestamp.format("%H:%M:%S"),
            record.outcome.as_str(),
            record.intent_id.as_deref().unwrap_or("-"),
            record.input
        );
    }
}

fn log_event(event: &DialogueEvent) {
    match event {
        DialogueEvent::TurnCompleted {
            intent_id, outcome, ..
        } => tracing::debug!(intent = ?intent_id, %outcome, "Turn completed"),
        DialogueEvent::ParameterRequested {
            intent_id, param, ..
        } => tracing::debug!(intent = %intent_id, %param, "Parameter requested"),
        DialogueEvent::ValidationRejected {
            intent_id,
            param,
            message,
            ..
        } => tracing::debug!(intent = %intent_id, %param, %message, "Answer rejected"),
        DialogueEvent::FulfillmentFailed {
            intent_id,
            error_message,
            ..
        } => tracing::warn!(intent = %intent_id, error = %error_message, "Fulfillment failed"),
        DialogueEvent::ContextsExpired { names, .. } => {
            tracing::debug!(?names, "Contexts expired")
        }
    }
}
