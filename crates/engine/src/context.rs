//! Context Store — named, turn-scoped memory with automatic expiry.
//!
//! Entries are written by an intent's output contexts and survive a bounded
//! number of completed turns. The store is advanced exactly once per completed
//! turn by the session; an entry whose remaining turns reach zero is purged
//! and never observable again.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named context and its remaining lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub name: String,
    pub data: Value,
    pub remaining_turns: u32,
}

/// Turn-scoped key/value memory of one conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextStore {
    /// Ordered by last write, oldest first.
    entries: Vec<ContextEntry>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a context. A zero lifespan removes it.
    pub fn set(&mut self, name: impl Into<String>, data: Value, lifespan: u32) {
        let name = name.into();
        self.entries.retain(|e| e.name != name);
        if lifespan == 0 {
            return;
        }
        self.entries.push(ContextEntry {
            name,
            data,
            remaining_turns: lifespan,
        });
    }

    /// The data of an active context.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.name == name && e.remaining_turns > 0)
            .map(|e| &e.data)
    }

    pub fn entry(&self, name: &str) -> Option<&ContextEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name && e.remaining_turns > 0)
    }

    /// Names of active contexts, oldest write first.
    pub fn active(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.remaining_turns > 0)
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Decrement every entry by one turn and purge the ones that reach zero.
    /// Returns the names of the purged entries.
    pub fn advance(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        self.entries.retain_mut(|e| {
            e.remaining_turns = e.remaining_turns.saturating_sub(1);
            if e.remaining_turns == 0 {
                expired.push(e.name.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() < before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_and_active() {
        let mut store = ContextStore::new();
        store.set("weather-followup", json!({"location": "Paris"}), 2);
        assert_eq!(store.get("weather-followup"), Some(&json!({"location": "Paris"})));
        assert_eq!(store.active(), vec!["weather-followup".to_string()]);
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn set_overwrites_and_refreshes_lifespan() {
        let mut store = ContextStore::new();
        store.set("a", json!(1), 1);
        store.set("a", json!(2), 3);
        assert_eq!(store.len(), 1);
        let entry = store.entry("a").unwrap();
        assert_eq!(entry.data, json!(2));
        assert_eq!(entry.remaining_turns, 3);
    }

    #[test]
    fn zero_lifespan_is_never_visible() {
        let mut store = ContextStore::new();
        store.set("a", json!(1), 2);
        store.set("a", json!(1), 0);
        assert!(store.is_empty());
        assert!(store.active().is_empty());
    }

    #[test]
    fn advance_expires_after_lifespan() {
        let mut store = ContextStore::new();
        store.set("short", json!(null), 1);
        store.set("long", json!(null), 3);

        assert_eq!(store.advance(), vec!["short".to_string()]);
        assert_eq!(store.active(), vec!["long".to_string()]);

        assert!(store.advance().is_empty());
        assert_eq!(store.advance(), vec!["long".to_string()]);
        assert!(store.is_empty());
    }

    #[test]
    fn active_is_ordered_by_last_write() {
        let mut store = ContextStore::new();
        store.set("a", json!(null), 2);
        store.set("b", json!(null), 2);
        store.set("a", json!(null), 2);
        assert_eq!(store.active(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn remove_and_clear() {
        let mut store = ContextStore::new();
        store.set("a", json!(null), 2);
        store.set("b", json!(null), 2);
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        store.clear();
        assert!(store.is_empty());
    }
}
