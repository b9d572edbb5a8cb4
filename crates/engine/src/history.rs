//! Turn history — a bounded record of completed turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// How a completed turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Fulfilled,
    FollowUp,
    Disambiguation,
    Fallback,
    /// The intent's fulfiller failed; the turn was attempted.
    Failed,
}

impl TurnOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fulfilled => "fulfilled",
            Self::FollowUp => "follow_up",
            Self::Disambiguation => "disambiguation",
            Self::Fallback => "fallback",
            Self::Failed => "failed",
        }
    }
}

/// One completed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub id: String,

    /// The utterance that started the turn. For slot-filled turns this is the
    /// original request, not the last answer.
    pub input: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<String>,

    pub outcome: TurnOutcome,

    /// The text returned to the user.
    pub summary: String,

    pub timestamp: DateTime<Utc>,
}

impl TurnRecord {
    pub fn new(
        input: impl Into<String>,
        intent_id: Option<String>,
        outcome: TurnOutcome,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            input: input.into(),
            intent_id,
            outcome,
            summary: summary.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ring buffer of the most recent turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnHistory {
    records: VecDeque<TurnRecord>,
    limit: usize,
}

impl TurnHistory {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            records: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Append a record, dropping the oldest beyond the limit.
    pub fn push(&mut self, record: TurnRecord) {
        while self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<TurnRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&TurnRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TurnRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for TurnHistory {
    fn default() -> Self {
        Self::new(10)
    }
}
