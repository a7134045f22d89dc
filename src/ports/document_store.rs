//! DocumentStore port - Interface for the document store holding timelines.
//!
//! Documents are addressed by collection and id, read whole, and updated
//! with a partial document whose top-level keys replace the stored ones.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::DomainError;

/// Version token returned with a document, used for compare-and-swap writes.
///
/// Mirrors the sequence number / primary term pair of search-engine style
/// stores; stores with a single counter leave `primary_term` at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentVersion {
    pub seq_no: u64,
    pub primary_term: u64,
}

impl DocumentVersion {
    pub fn new(seq_no: u64, primary_term: u64) -> Self {
        Self {
            seq_no,
            primary_term,
        }
    }
}

/// A document as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub source: Value,
    pub version: Option<DocumentVersion>,
}

/// Port for reading and updating documents.
///
/// # Contract
///
/// - `get` returns `Ok(None)` when the document does not exist.
/// - `update` merges the top-level keys of `doc` into the stored document
///   and returns the merged source.
/// - When `expected` is given and the stored version differs, `update`
///   fails with `ErrorCode::VersionConflict` and writes nothing.
/// - Transport failures use `ErrorCode::DocumentStoreError`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, DomainError>;

    /// Update a document by id.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        doc: Value,
        expected: Option<DocumentVersion>,
    ) -> Result<Value, DomainError>;
}
