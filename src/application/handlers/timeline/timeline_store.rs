//! Typed access to timeline documents on top of the `DocumentStore` port.

use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode, TimelineId};
use crate::domain::timeline::{TimelineDocument, TimelineError};
use crate::ports::{DocumentStore, DocumentVersion};

/// A timeline as read, with the version it was read at.
#[derive(Debug, Clone)]
pub struct LoadedTimeline {
    pub id: TimelineId,
    pub document: TimelineDocument,
    version: Option<DocumentVersion>,
}

impl LoadedTimeline {
    pub fn version(&self) -> Option<DocumentVersion> {
        self.version
    }
}

/// Reads and writes timeline documents in one collection.
///
/// With optimistic concurrency on, a save only succeeds if nobody wrote the
/// document since it was loaded; otherwise the last write wins.
#[derive(Clone)]
pub struct TimelineStore {
    documents: Arc<dyn DocumentStore>,
    collection: String,
    optimistic_concurrency: bool,
}

impl TimelineStore {
    /// Creates a store over `collection` with optimistic concurrency enabled.
    pub fn new(documents: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            documents,
            collection: collection.into(),
            optimistic_concurrency: true,
        }
    }

    pub fn with_optimistic_concurrency(mut self, enabled: bool) -> Self {
        self.optimistic_concurrency = enabled;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Reads a timeline. A missing document is `TimelineNotFound`.
    pub async fn load(&self, id: TimelineId) -> Result<LoadedTimeline, DomainError> {
        let stored = self
            .documents
            .get(&self.collection, &id.to_string())
            .await?
            .ok_or(TimelineError::NotFound(id))?;

        let document: TimelineDocument = serde_json::from_value(stored.source).map_err(|e| {
            DomainError::new(
                ErrorCode::DocumentStoreError,
                format!("Stored timeline is not decodable: {}", e),
            )
            .with_detail("timeline_id", id.to_string())
        })?;

        debug!(
            timeline_id = %id,
            milestones = document.milestones.len(),
            "Loaded timeline document"
        );

        Ok(LoadedTimeline {
            id,
            document,
            version: stored.version,
        })
    }

    /// Writes back the complete milestone list of a loaded timeline.
    pub async fn save(&self, timeline: &LoadedTimeline) -> Result<(), DomainError> {
        let doc = timeline.document.milestones_update().map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to encode milestones: {}", e),
            )
        })?;
        let expected = if self.optimistic_concurrency {
            timeline.version
        } else {
            None
        };

        self.documents
            .update(&self.collection, &timeline.id.to_string(), doc, expected)
            .await?;

        debug!(
            timeline_id = %timeline.id,
            milestones = timeline.document.milestones.len(),
            conditional = expected.is_some(),
            "Saved timeline document"
        );
        Ok(())
    }
}
