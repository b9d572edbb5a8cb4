//! Dialogue event system — lets observers follow a conversation without
//! coupling to the engine.
//!
//! Events are published when a turn completes, a parameter is requested, an
//! answer is rejected, a fulfillment fails or contexts expire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All dialogue events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DialogueEvent {
    /// A turn reached a terminal response
    TurnCompleted {
        session_id: String,
        intent_id: Option<String>,
        outcome: String,
        timestamp: DateTime<Utc>,
    },

    /// The engine prompted for a missing parameter
    ParameterRequested {
        session_id: String,
        intent_id: String,
        param: String,
        timestamp: DateTime<Utc>,
    },

    /// A validator rejected an answer
    ValidationRejected {
        session_id: String,
        intent_id: String,
        param: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// An intent's fulfiller returned an error
    FulfillmentFailed {
        session_id: String,
        intent_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// Contexts reached the end of their lifespan
    ContextsExpired {
        session_id: String,
        names: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for dialogue events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DialogueEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DialogueEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DialogueEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
