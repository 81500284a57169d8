//! Per-conversation state.
//!
//! [`ConversationSession`] is an owned value the front end mutates through
//! explicit methods; there is no module-level state. One session per
//! active user; nothing persists across restarts.
//!
//! Invariants maintained by every mutation:
//! - the selection flags always have the same length as the result list;
//! - the result list holds no two entries with the same `(name, location)`;
//! - `result_version` increases by exactly one per search round.

use crate::aggregate::SearchRound;
use crate::models::SearchHit;

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. The transcript is append-only.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ConversationSession {
    transcript: Vec<Message>,
    last_results: Vec<SearchHit>,
    selected: Vec<bool>,
    result_version: u64,
    debug_payloads: Vec<serde_json::Value>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.transcript.push(Message {
            role: Role::User,
            text: text.into(),
        });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.transcript.push(Message {
            role: Role::Assistant,
            text: text.into(),
        });
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.last_results
    }

    /// Monotonic counter namespacing selection state per search round, so
    /// a stale selection from a previous round can never be read as
    /// current.
    pub fn result_version(&self) -> u64 {
        self.result_version
    }

    pub fn debug_payloads(&self) -> &[serde_json::Value] {
        &self.debug_payloads
    }

    pub fn is_selected(&self, idx: usize) -> bool {
        self.selected.get(idx).copied().unwrap_or(false)
    }

    /// Applies a completed search round: per-keyword errors and the
    /// round outcome go to the transcript; results, selection flags,
    /// debug payloads are replaced wholesale and the version bumps.
    pub fn apply_round(&mut self, query: &str, round: SearchRound) {
        for err in &round.errors {
            self.push_assistant(format!(
                "Error searching for '{}': {}",
                err.keyword, err.message
            ));
        }

        self.last_results = round.hits;
        self.selected = vec![false; self.last_results.len()];
        self.result_version += 1;
        self.debug_payloads = round.debug;

        let message = if self.last_results.is_empty() {
            format!("No results found for '{}'.", query)
        } else {
            format!(
                "Found {} documents (select to summarize).",
                self.last_results.len()
            )
        };
        self.push_assistant(message);
    }

    /// Flips the selection flag for a result. Returns the new state, or
    /// `None` if the index is out of range (no state change).
    pub fn toggle(&mut self, idx: usize) -> Option<bool> {
        let flag = self.selected.get_mut(idx)?;
        *flag = !*flag;
        Some(*flag)
    }

    /// Selected hits in presentation order.
    pub fn selected_hits(&self) -> Vec<SearchHit> {
        self.last_results
            .iter()
            .zip(&self.selected)
            .filter(|(_, &sel)| sel)
            .map(|(hit, _)| hit.clone())
            .collect()
    }
}
