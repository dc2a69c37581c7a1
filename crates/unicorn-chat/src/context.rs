//! Conversation state.
//!
//! Holds the committed history and the current result subset of one
//! session. Mutated once per turn, and only by resolved turns.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::types::{HistoryEntry, ResultSet, TurnResult};

/// Names kept per history entry.
const SUMMARY_NAMES: usize = 10;

/// Per-session mutable state. One instance per session, never shared.
#[derive(Debug, Clone)]
pub struct ConversationState {
    id: Uuid,
    started_at: DateTime<Utc>,
    history: Vec<HistoryEntry>,
    current_context: ResultSet,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Fresh session with no history and no context.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            history: Vec::new(),
            current_context: ResultSet::empty(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    pub fn current_context(&self) -> &ResultSet {
        &self.current_context
    }

    pub fn has_context(&self) -> bool {
        !self.current_context.is_empty()
    }

    /// Commit a turn.
    ///
    /// Resolved turns append one history entry and replace the context.
    /// Clarification turns leave both untouched.
    pub fn apply(&mut self, turn: TurnResult) {
        match turn {
            TurnResult::Resolved {
                query,
                tier,
                results,
            } => {
                self.history.push(HistoryEntry {
                    query,
                    summary: results.summary(Some(tier), SUMMARY_NAMES),
                    at: Utc::now(),
                });
                self.current_context = results;
            }
            TurnResult::Clarification { query } => {
                debug!(session = %self.id, query = %query, "Clarification turn, state unchanged");
            }
        }
    }

    /// Clear history and context (explicit session restart only).
    pub fn reset(&mut self) {
        self.history.clear();
        self.current_context = ResultSet::empty();
    }

    /// Keep only the most recent `keep` history entries.
    pub fn trim_history(&mut self, keep: usize) {
        if self.history.len() > keep {
            let excess = self.history.len() - keep;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use unicorn_core::{CompanyRecord, RowKey, Tier};

    fn results(names: &[&str]) -> ResultSet {
        ResultSet::from_rows(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| Arc::new(CompanyRecord::new(RowKey(i), *n)))
                .collect(),
        )
    }

    fn resolved(query: &str, names: &[&str]) -> TurnResult {
        TurnResult::Resolved {
            query: query.to_string(),
            tier: Tier::Sector,
            results: results(names),
        }
    }

    // ---- Creation ----

    #[test]
    fn test_new_state_is_empty() {
        let state = ConversationState::new();
        assert!(state.history().is_empty());
        assert!(!state.has_context());
        assert!(state.last_entry().is_none());
        assert_ne!(state.id(), Uuid::nil());
    }

    #[test]
    fn test_states_have_distinct_ids() {
        assert_ne!(ConversationState::new().id(), ConversationState::new().id());
    }

    // ---- apply ----

    #[test]
    fn test_resolved_turn_appends_and_replaces_context() {
        let mut state = ConversationState::new();
        state.apply(resolved("fintech", &["Juspay", "Money View"]));
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.current_context().names(), vec!["Juspay", "Money View"]);

        let entry = state.last_entry().unwrap();
        assert_eq!(entry.query, "fintech");
        assert_eq!(entry.summary.rows, 2);
        assert_eq!(entry.summary.tier, Some(Tier::Sector));
    }

    #[test]
    fn test_clarification_turn_leaves_state_untouched() {
        let mut state = ConversationState::new();
        state.apply(resolved("fintech", &["Juspay"]));
        let before = state.last_entry().cloned();

        state.apply(TurnResult::Clarification {
            query: "best ones?".to_string(),
        });

        assert_eq!(state.history().len(), 1);
        assert_eq!(state.last_entry().cloned(), before);
        assert_eq!(state.current_context().names(), vec!["Juspay"]);
    }

    #[test]
    fn test_resolved_empty_result_clears_context() {
        let mut state = ConversationState::new();
        state.apply(resolved("fintech", &["Juspay"]));
        state.apply(resolved("in mumbai", &[]));
        assert!(!state.has_context());
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn test_summary_names_capped() {
        let names: Vec<String> = (0..15).map(|i| format!("C{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut state = ConversationState::new();
        state.apply(resolved("all", &refs));
        let entry = state.last_entry().unwrap();
        assert_eq!(entry.summary.rows, 15);
        assert_eq!(entry.summary.names.len(), SUMMARY_NAMES);
    }

    // ---- reset / trim ----

    #[test]
    fn test_reset_clears_everything() {
        let mut state = ConversationState::new();
        let id = state.id();
        state.apply(resolved("fintech", &["Juspay"]));
        state.reset();
        assert!(state.history().is_empty());
        assert!(!state.has_context());
        assert_eq!(state.id(), id);
    }

    #[test]
    fn test_trim_history_keeps_most_recent() {
        let mut state = ConversationState::new();
        for i in 0..5 {
            state.apply(resolved(&format!("query {}", i), &["A"]));
        }
        state.trim_history(3);
        assert_eq!(state.history().len(), 3);
        assert_eq!(state.history()[0].query, "query 2");
        assert_eq!(state.last_entry().unwrap().query, "query 4");
    }

    #[test]
    fn test_trim_history_noop_when_short() {
        let mut state = ConversationState::new();
        state.apply(resolved("q", &["A"]));
        state.trim_history(10);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_trim_does_not_touch_context() {
        let mut state = ConversationState::new();
        state.apply(resolved("q", &["A", "B"]));
        state.trim_history(0);
        assert!(state.history().is_empty());
        assert_eq!(state.current_context().len(), 2);
    }
}
