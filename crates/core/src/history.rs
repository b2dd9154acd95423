//! Conversation History
//!
//! A bounded, ordered log of the turns exchanged with the AI backend. The
//! orchestrator owns one instance per session and appends a user/model pair
//! after every completed exchange; nothing here is persisted.

use serde::{Deserialize, Serialize};

/// Number of turns above which the history is considered over limit.
const PRUNE_THRESHOLD: usize = 10;
/// Number of most recent turns retained after pruning.
const PRUNE_KEEP: usize = 8;

/// The author of a single conversation turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of the conversation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Ordered sequence of conversation turns with a recency cap.
///
/// Turns are expected to be appended in matched user/model pairs, but the
/// store does not enforce alternation; that discipline belongs to the caller.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user turn.
    pub fn append_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            text: text.into(),
        });
    }

    /// Appends a model turn.
    pub fn append_model(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Model,
            text: text.into(),
        });
    }

    /// Returns a read-only ordered copy, used to build an AI request.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Drops the oldest turns once the log exceeds the threshold, keeping only
    /// the most recent ones. Recency wins over the session's earliest context.
    pub fn prune_if_over_limit(&mut self) {
        if self.turns.len() > PRUNE_THRESHOLD {
            self.turns.drain(..self.turns.len() - PRUNE_KEEP);
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
