//! # Calculation History
//!
//! A bounded, newest-first log of `(expression, result)` pairs. Calculators
//! never write here themselves; they produce a [`HistoryEntryDraft`] and the
//! presentation layer decides whether to keep it.
//!
//! The log lives in memory and is mirrored to a [`KeyValueStore`] under
//! [`HISTORY_KEY`] after every change. If the stored log cannot be read the
//! store starts empty and logs a warning.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::history::{HistoryEntryDraft, HistoryStore};
//! use calc_core::storage::MemoryStore;
//!
//! let mut history = HistoryStore::open(MemoryStore::new(), 50);
//! history.append(HistoryEntryDraft::new("2+3×4", "14"))?;
//! assert_eq!(history.list()[0].result, "14");
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CalcResult;
use crate::storage::{decode, encode, KeyValueStore};

/// Storage key for the persisted log
pub const HISTORY_KEY: &str = "calcuMasterHistory";

/// Default number of entries kept
pub const HISTORY_LIMIT: usize = 50;

/// An entry that has not been recorded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryDraft {
    pub expression: String,
    pub result: String,
}

impl HistoryEntryDraft {
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        HistoryEntryDraft {
            expression: expression.into(),
            result: result.into(),
        }
    }
}

/// A recorded calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub expression: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    fn from_draft(draft: HistoryEntryDraft) -> Self {
        HistoryEntry {
            id: Uuid::new_v4(),
            expression: draft.expression,
            result: draft.result,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded history log over a key-value backend.
pub struct HistoryStore<S: KeyValueStore> {
    backend: S,
    entries: Vec<HistoryEntry>,
    limit: usize,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Load the persisted log from `backend`, keeping at most `limit`
    /// entries (a limit of 0 is treated as 1).
    pub fn open(backend: S, limit: usize) -> Self {
        let limit = limit.max(1);
        let mut entries = match load_entries(&backend) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(key = HISTORY_KEY, error = %e, "could not load history, starting empty");
                Vec::new()
            }
        };
        entries.truncate(limit);
        tracing::debug!(count = entries.len(), limit, "history loaded");

        HistoryStore {
            backend,
            entries,
            limit,
        }
    }

    /// Record a calculation at the front of the log, evicting the oldest
    /// entry past the limit.
    ///
    /// The in-memory log is updated even when persisting fails; the
    /// persistence error is still returned.
    pub fn append(&mut self, draft: HistoryEntryDraft) -> CalcResult<Uuid> {
        let entry = HistoryEntry::from_draft(draft);
        let id = entry.id;
        self.entries.insert(0, entry);
        if self.entries.len() > self.limit {
            let evicted = self.entries.len() - self.limit;
            self.entries.truncate(self.limit);
            tracing::debug!(evicted, "history limit reached");
        }
        self.persist()?;
        Ok(id)
    }

    /// Entries, most recent first.
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drop every entry and the persisted log.
    pub fn clear(&mut self) -> CalcResult<()> {
        self.entries.clear();
        self.backend.remove(HISTORY_KEY).inspect_err(|e| {
            tracing::error!(key = HISTORY_KEY, error = %e, "failed to clear persisted history");
        })
    }

    /// Give back the backend, e.g. to share it with the favorites store.
    pub fn into_backend(self) -> S {
        self.backend
    }

    fn persist(&mut self) -> CalcResult<()> {
        let raw = encode(&self.entries)?;
        self.backend.set(HISTORY_KEY, &raw).inspect_err(|e| {
            tracing::error!(key = HISTORY_KEY, error = %e, "failed to persist history");
        })
    }
}

fn load_entries<S: KeyValueStore>(backend: &S) -> CalcResult<Vec<HistoryEntry>> {
    match backend.get(HISTORY_KEY)? {
        Some(raw) => decode(&raw),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;
    use crate::storage::{FileStore, MemoryStore};

    /// Backend whose writes always fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> CalcResult<Option<String>> {
            Ok(None)
        }
        fn set(&mut self, key: &str, _value: &str) -> CalcResult<()> {
            Err(CalcError::storage("set", key, "read-only"))
        }
        fn remove(&mut self, key: &str) -> CalcResult<()> {
            Err(CalcError::storage("remove", key, "read-only"))
        }
    }

    #[test]
    fn test_append_newest_first() {
        let mut history = HistoryStore::open(MemoryStore::new(), HISTORY_LIMIT);
        history.append(HistoryEntryDraft::new("1+1", "2")).unwrap();
        history.append(HistoryEntryDraft::new("2+2", "4")).unwrap();

        let results: Vec<_> = history.list().iter().map(|e| e.result.as_str()).collect();
        assert_eq!(results, vec!["4", "2"]);
        assert_ne!(history.list()[0].id, history.list()[1].id);
    }

    #[test]
    fn test_bounded_to_limit() {
        let mut history = HistoryStore::open(MemoryStore::new(), HISTORY_LIMIT);
        for i in 0..60 {
            history.append(HistoryEntryDraft::new(format!("{}+0", i), i.to_string())).unwrap();
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.list()[0].result, "59");
        assert_eq!(history.list()[49].result, "10");
    }

    #[test]
    fn test_persists_and_reloads() {
        let mut history = HistoryStore::open(MemoryStore::new(), 10);
        history.append(HistoryEntryDraft::new("5!", "120")).unwrap();
        let backend = history.into_backend();

        let reloaded = HistoryStore::open(backend, 10);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.list()[0].expression, "5!");
    }

    #[test]
    fn test_reload_applies_smaller_limit() {
        let mut history = HistoryStore::open(MemoryStore::new(), 10);
        for i in 0..5 {
            history.append(HistoryEntryDraft::new("x", i.to_string())).unwrap();
        }
        let reloaded = HistoryStore::open(history.into_backend(), 2);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.list()[0].result, "4");
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryStore::open(MemoryStore::new(), 10);
        history.append(HistoryEntryDraft::new("1+1", "2")).unwrap();
        history.clear().unwrap();
        assert!(history.is_empty());

        let backend = history.into_backend();
        assert_eq!(backend.get(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_state_starts_empty() {
        let mut backend = MemoryStore::new();
        backend.set(HISTORY_KEY, "{not json").unwrap();
        let history = HistoryStore::open(backend, 10);
        assert!(history.is_empty());
    }

    #[test]
    fn test_persist_failure_keeps_memory_change() {
        let mut history = HistoryStore::open(ReadOnlyStore, 10);
        let err = history.append(HistoryEntryDraft::new("1+1", "2")).unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_file_backed_history() {
        let dir = tempfile::tempdir().unwrap();
        {
            let backend = FileStore::open(dir.path(), "test").unwrap();
            let mut history = HistoryStore::open(backend, HISTORY_LIMIT);
            history.append(HistoryEntryDraft::new("1 km to m", "1,000 m")).unwrap();
        }
        let backend = FileStore::open(dir.path(), "test").unwrap();
        let history = HistoryStore::open(backend, HISTORY_LIMIT);
        assert_eq!(history.list()[0].result, "1,000 m");
    }
}
