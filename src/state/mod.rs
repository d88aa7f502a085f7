//! Session state
//!
//! History lives in an explicit state value owned by whoever runs the
//! session (the CLI for one query, the API per session id). Nothing here is
//! global.

use crate::models::HistoryEntry;
use serde::Serialize;

/// Append-only log of completed requests, oldest first.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }
}

/// A query is dispatched only if something remains after trimming.
pub fn is_dispatchable(query: &str) -> bool {
    !query.trim().is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    EmptyQuery,
    Busy,
}

/// Per-session state threaded through each request.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub history: HistoryStore,
    busy: bool,
    pending_query: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn pending_query(&self) -> Option<&str> {
        self.pending_query.as_deref()
    }

    /// Queue a query. Blank queries and submissions while busy are refused.
    pub fn submit(&mut self, query: &str) -> Result<(), SubmitRejection> {
        if self.busy {
            return Err(SubmitRejection::Busy);
        }
        if !is_dispatchable(query) {
            return Err(SubmitRejection::EmptyQuery);
        }

        self.pending_query = Some(query.to_string());
        self.busy = true;
        Ok(())
    }

    /// Take the pending query for processing; the session stays busy.
    pub(crate) fn take_pending(&mut self) -> Option<String> {
        self.pending_query.take()
    }

    /// Record the outcome and accept new submissions again.
    pub(crate) fn complete(&mut self, entry: HistoryEntry) {
        self.history.append(entry);
        self.pending_query = None;
        self.busy = false;
    }

    pub(crate) fn reset_idle(&mut self) {
        self.pending_query = None;
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_insertion_order() {
        let mut store = HistoryStore::new();
        store.append(HistoryEntry::response("first", "a"));
        store.append(HistoryEntry::response("second", "b"));
        store.append(HistoryEntry::response("third", "c"));

        let queries: Vec<&str> = store.all().iter().map(|e| e.query()).collect();
        assert_eq!(queries, vec!["first", "second", "third"]);
        assert_eq!(store.last().unwrap().query(), "third");
    }

    #[test]
    fn test_dispatchable_queries() {
        assert!(is_dispatchable("research bees"));
        assert!(is_dispatchable("  hi  "));
        assert!(!is_dispatchable(""));
        assert!(!is_dispatchable(" \n\t "));
    }

    #[test]
    fn test_submit_rejects_blank() {
        let mut state = SessionState::new();
        assert_eq!(state.submit("   \n\t"), Err(SubmitRejection::EmptyQuery));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_submit_while_busy() {
        let mut state = SessionState::new();
        state.submit("first").unwrap();
        assert!(state.is_busy());
        assert_eq!(state.pending_query(), Some("first"));
        assert_eq!(state.submit("second"), Err(SubmitRejection::Busy));
        assert_eq!(state.pending_query(), Some("first"));
    }

    #[test]
    fn test_complete_clears_busy() {
        let mut state = SessionState::new();
        state.submit("q").unwrap();
        let query = state.take_pending().unwrap();
        state.complete(HistoryEntry::response(query, "answer"));

        assert!(!state.is_busy());
        assert_eq!(state.pending_query(), None);
        assert_eq!(state.history.len(), 1);
        assert!(state.submit("next").is_ok());
    }

    #[test]
    fn test_history_serializes_as_array() {
        let mut store = HistoryStore::new();
        store.append(HistoryEntry::response("q", "a"));
        let json = serde_json::to_value(&store).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["query"], "q");
        assert_eq!(json[0]["response"], "a");
        assert!(json[0]["structured"].is_null());
    }
}
