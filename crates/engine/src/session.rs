//! Session — the mutable state of one conversation.
//!
//! A session owns its Context Store, turn history and the single outstanding
//! parameter collection, if any. The engine borrows it mutably for the whole
//! of a turn, so overlapping turns on one session cannot be expressed.
//! Independent conversations use independent sessions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use colloquy_core::behavior::Params;

use crate::context::{ContextEntry, ContextStore};
use crate::history::{TurnHistory, TurnRecord};

/// A started intent waiting for the user to supply a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCollection {
    pub intent_id: String,
    pub collected: Params,
    /// Name of the parameter the last prompt asked for.
    pub awaiting: String,
    /// The utterance that selected the intent.
    pub original_input: String,
    /// The intent was selected with medium confidence.
    #[serde(default)]
    pub hedged: bool,
    /// The intent was entered through a follow-up.
    #[serde(default)]
    pub follow_up: bool,
}

/// One conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: String,
    contexts: ContextStore,
    pending: Option<PendingCollection>,
    history: TurnHistory,
    turns_completed: u64,
}

impl Session {
    pub fn new(history_limit: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contexts: ContextStore::new(),
            pending: None,
            history: TurnHistory::new(history_limit),
            turns_completed: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    // ── Introspection ──

    /// Names of the active contexts.
    pub fn active_contexts(&self) -> Vec<String> {
        self.contexts.active()
    }

    /// Data of an active context.
    pub fn context(&self, name: &str) -> Option<&Value> {
        self.contexts.get(name)
    }

    pub fn context_entries(&self) -> &[ContextEntry] {
        self.contexts.entries()
    }

    /// Completed turns, oldest first, bounded by the history limit.
    pub fn history(&self) -> Vec<TurnRecord> {
        self.history.snapshot()
    }

    pub fn last_turn(&self) -> Option<&TurnRecord> {
        self.history.last()
    }

    /// The parameter currently being collected.
    pub fn awaiting(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.awaiting.as_str())
    }

    pub fn pending(&self) -> Option<&PendingCollection> {
        self.pending.as_ref()
    }

    pub fn turns_completed(&self) -> u64 {
        self.turns_completed
    }

    // ── Control ──

    /// Drop an outstanding collection. No turn is recorded.
    pub fn cancel_pending(&mut self) -> Option<PendingCollection> {
        self.pending.take()
    }

    /// Forget everything but the id.
    pub fn reset(&mut self) {
        self.contexts.clear();
        self.pending = None;
        self.history.clear();
        self.turns_completed = 0;
    }

    /// Direct access to the store, for seeding contexts from outside a turn.
    pub fn contexts_mut(&mut self) -> &mut ContextStore {
        &mut self.contexts
    }

    // ── Engine-side transitions ──

    pub(crate) fn set_pending(&mut self, pending: PendingCollection) {
        self.pending = Some(pending);
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingCollection> {
        self.pending.take()
    }

    /// Close a turn: age existing contexts by one turn, then write the turn's
    /// output contexts and record it. Returns the names of expired contexts.
    ///
    /// A context written here is visible for the next `lifespan` turns.
    pub(crate) fn complete_turn(
        &mut self,
        record: TurnRecord,
        outputs: Vec<(String, Value, u32)>,
    ) -> Vec<String> {
        let expired = self.contexts.advance();
        for (name, data, lifespan) in outputs {
            self.contexts.set(name, data, lifespan);
        }
        self.history.push(record);
        self.turns_completed += 1;
        expired
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TurnHistory::default().limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::TurnOutcome;
    use serde_json::json;

    fn record(input: &str) -> TurnRecord {
        TurnRecord::new(input, None, TurnOutcome::Fallback, "sorry")
    }

    #[test]
    fn sessions_have_distinct_ids() {
        assert_ne!(Session::default().id(), Session::default().id());
    }

    #[test]
    fn context_written_in_turn_lives_for_lifespan_turns() {
        let mut session = Session::default();
        session.complete_turn(
            record("weather in Paris"),
            vec![("weather-followup".into(), json!({"location": "Paris"}), 2)],
        );
        assert_eq!(session.active_contexts(), vec!["weather-followup".to_string()]);

        session.complete_turn(record("and tomorrow?"), Vec::new());
        assert!(session.context("weather-followup").is_some());

        let expired = session.complete_turn(record("thanks"), Vec::new());
        assert_eq!(expired, vec!["weather-followup".to_string()]);
        assert!(session.active_contexts().is_empty());
        assert_eq!(session.turns_completed(), 3);
    }

    #[test]
    fn cancel_pending_records_nothing() {
        let mut session = Session::default();
        session.set_pending(PendingCollection {
            intent_id: "reminder".into(),
            collected: Params::new(),
            awaiting: "task".into(),
            original_input: "remind me".into(),
            hedged: false,
            follow_up: false,
        });
        assert_eq!(session.awaiting(), Some("task"));
        assert!(session.cancel_pending().is_some());
        assert!(session.awaiting().is_none());
        assert!(session.history().is_empty());
    }

    #[test]
    fn reset_clears_state_but_keeps_id() {
        let mut session = Session::new(5);
        let id = session.id().to_string();
        session.complete_turn(record("a"), vec![("ctx".into(), json!(null), 3)]);
        session.reset();
        assert_eq!(session.id(), id);
        assert!(session.active_contexts().is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.turns_completed(), 0);
    }
}
