//! PhaseRepository port - Relational access for the progress cascade.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventId, PhaseId, ProductId, Progress, ProjectId};
use crate::domain::phase::{PhaseRecord, ProductRecord, ProgressAdvance, ProjectRecord};

/// Port for the product → phase → project lookups and the phase progress write.
///
/// Lookups return `Ok(None)` for a missing row; callers decide whether that
/// is an error.
#[async_trait]
pub trait PhaseRepository: Send + Sync {
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, DomainError>;

    async fn find_phase(&self, id: PhaseId) -> Result<Option<PhaseRecord>, DomainError>;

    async fn find_project(&self, id: ProjectId) -> Result<Option<ProjectRecord>, DomainError>;

    /// Sets `original`'s progress to `progress`, at most once per `event_id`.
    ///
    /// Only the `progress` column of the phase is written. The change is
    /// recorded against `event_id` in the same write; a later call with the
    /// same event id writes nothing and returns the change as first recorded,
    /// with `replayed` set.
    async fn apply_progress(
        &self,
        event_id: &EventId,
        original: &PhaseRecord,
        progress: Progress,
    ) -> Result<ProgressAdvance, DomainError>;
}
