//! In-memory PhaseRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, PhaseId, ProductId, Progress, ProjectId,
};
use crate::domain::phase::{PhaseRecord, ProductRecord, ProgressAdvance, ProjectRecord};
use crate::ports::PhaseRepository;

#[derive(Default)]
struct Tables {
    products: HashMap<ProductId, ProductRecord>,
    phases: HashMap<PhaseId, PhaseRecord>,
    projects: HashMap<ProjectId, ProjectRecord>,
    applied: HashMap<EventId, (Progress, Progress)>,
    progress_writes: usize,
}

/// Relational rows held in maps. For tests and local runs.
#[derive(Default)]
pub struct InMemoryPhaseRepository {
    tables: RwLock<Tables>,
}

impl InMemoryPhaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_product(&self, product: ProductRecord) {
        self.tables.write().await.products.insert(product.id, product);
    }

    pub async fn add_phase(&self, phase: PhaseRecord) {
        self.tables.write().await.phases.insert(phase.id, phase);
    }

    pub async fn add_project(&self, project: ProjectRecord) {
        self.tables.write().await.projects.insert(project.id, project);
    }

    pub async fn phase(&self, id: PhaseId) -> Option<PhaseRecord> {
        self.tables.read().await.phases.get(&id).cloned()
    }

    /// Number of `apply_progress` calls that wrote a row.
    pub async fn progress_writes(&self) -> usize {
        self.tables.read().await.progress_writes
    }
}

#[async_trait]
impl PhaseRepository for InMemoryPhaseRepository {
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, DomainError> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn find_phase(&self, id: PhaseId) -> Result<Option<PhaseRecord>, DomainError> {
        Ok(self.tables.read().await.phases.get(&id).cloned())
    }

    async fn find_project(&self, id: ProjectId) -> Result<Option<ProjectRecord>, DomainError> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn apply_progress(
        &self,
        event_id: &EventId,
        original: &PhaseRecord,
        progress: Progress,
    ) -> Result<ProgressAdvance, DomainError> {
        let mut tables = self.tables.write().await;

        if let Some((from, to)) = tables.applied.get(event_id) {
            return Ok(ProgressAdvance {
                original: original.with_progress(*from),
                updated: original.with_progress(*to),
                replayed: true,
            });
        }

        let phase = tables.phases.get_mut(&original.id).ok_or_else(|| {
            DomainError::new(ErrorCode::PhaseNotFound, "Phase not found")
                .with_detail("phase_id", original.id.to_string())
        })?;
        phase.progress = progress;
        let updated = phase.clone();

        tables
            .applied
            .insert(event_id.clone(), (original.progress, updated.progress));
        tables.progress_writes += 1;

        Ok(ProgressAdvance {
            original: original.clone(),
            updated,
            replayed: false,
        })
    }
}
