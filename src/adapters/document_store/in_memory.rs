//! In-memory document store.
//!
//! Versioned like the real store: every successful update bumps the
//! sequence number, and a conditional update against a stale version fails
//! with `VersionConflict`. Counts reads and writes for tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{DocumentStore, DocumentVersion, StoredDocument};

type Key = (String, String);

#[derive(Default)]
struct State {
    documents: HashMap<Key, (Value, u64)>,
    bump_after_read: HashSet<Key>,
    fail_next_update: Option<String>,
}

/// Process-local `DocumentStore`.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    state: Mutex<State>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `source` under `collection/id`, replacing any previous document.
    pub fn insert(&self, collection: &str, id: &str, source: Value) {
        self.state()
            .documents
            .insert((collection.to_string(), id.to_string()), (source, 0));
    }

    /// Current source of `collection/id`.
    pub fn document(&self, collection: &str, id: &str) -> Option<Value> {
        self.state()
            .documents
            .get(&(collection.to_string(), id.to_string()))
            .map(|(source, _)| source.clone())
    }

    /// Number of `get` calls served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `update` calls received, successful or not.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes the next `update` fail with `DocumentStoreError`.
    pub fn fail_next_update(&self, message: impl Into<String>) {
        self.state().fail_next_update = Some(message.into());
    }

    /// Simulates a concurrent writer: the next read of `collection/id`
    /// returns the current version, then the stored version moves on.
    pub fn bump_version_on_next_read(&self, collection: &str, id: &str) {
        self.state()
            .bump_after_read
            .insert((collection.to_string(), id.to_string()));
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let key = (collection.to_string(), id.to_string());
        let mut state = self.state();

        let bump = state.bump_after_read.remove(&key);
        let Some((source, seq_no)) = state.documents.get_mut(&key) else {
            return Ok(None);
        };
        let stored = StoredDocument {
            id: id.to_string(),
            source: source.clone(),
            version: Some(DocumentVersion::new(*seq_no, 1)),
        };
        if bump {
            *seq_no += 1;
        }
        Ok(Some(stored))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        doc: Value,
        expected: Option<DocumentVersion>,
    ) -> Result<Value, DomainError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();

        if let Some(message) = state.fail_next_update.take() {
            return Err(DomainError::new(ErrorCode::DocumentStoreError, message));
        }

        let Some((source, seq_no)) = state
            .documents
            .get_mut(&(collection.to_string(), id.to_string()))
        else {
            return Err(DomainError::new(
                ErrorCode::DocumentStoreError,
                "Document missing on update",
            )
            .with_detail("id", id));
        };

        if let Some(expected) = expected {
            if expected != DocumentVersion::new(*seq_no, 1) {
                return Err(DomainError::new(
                    ErrorCode::VersionConflict,
                    "Document changed since it was read",
                )
                .with_detail("id", id)
                .with_detail("expected_seq_no", expected.seq_no.to_string()));
            }
        }

        let Value::Object(patch) = doc else {
            return Err(DomainError::new(
                ErrorCode::DocumentStoreError,
                "Partial document must be a JSON object",
            ));
        };
        if !source.is_object() {
            *source = Value::Object(Map::new());
        }
        if let Value::Object(fields) = source {
            fields.extend(patch);
        }
        *seq_no += 1;

        Ok(source.clone())
    }
}
