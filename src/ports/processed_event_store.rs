//! ProcessedEventStore port - Interface for tracking processed events.
//!
//! Status-change events are delivered at least once. Replaying one after the
//! phase write succeeded would add the milestone's share to the progress a
//! second time, so the cascade path records which events it has applied.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventId};

/// Port for tracking which events have been processed by which handlers.
///
/// Each handler keeps its own record, so two handlers may both process the
/// same event exactly once.
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Check if an event has been processed by a specific handler.
    async fn contains(&self, event_id: &EventId, handler_name: &str) -> Result<bool, DomainError>;

    /// Mark an event as processed by a specific handler.
    ///
    /// Call only after the handler succeeded.
    async fn mark_processed(&self, event_id: &EventId, handler_name: &str)
        -> Result<(), DomainError>;
}
