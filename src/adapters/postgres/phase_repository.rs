//! PostgreSQL implementation of PhaseRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, PhaseId, ProductId, Progress, ProjectId,
};
use crate::domain::phase::{PhaseRecord, ProductRecord, ProgressAdvance, ProjectRecord};
use crate::ports::PhaseRepository;

/// PostgreSQL implementation of PhaseRepository.
///
/// Expects `products(id, phase_id)`, `phases(id, project_id, progress)` and
/// `projects(id, name)`; `progress` is a double precision percentage.
/// Applied changes go to `phase_progress_events(event_id text primary key,
/// phase_id, original_progress, updated_progress)` in the same transaction
/// as the phase update.
#[derive(Clone)]
pub struct PostgresPhaseRepository {
    pool: PgPool,
}

impl PostgresPhaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhaseRepository for PostgresPhaseRepository {
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, DomainError> {
        let row = sqlx::query("SELECT id, phase_id FROM products WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to fetch product: {}", e)))?;

        Ok(row.map(|r| ProductRecord {
            id: ProductId::new(r.get("id")),
            phase_id: PhaseId::new(r.get("phase_id")),
        }))
    }

    async fn find_phase(&self, id: PhaseId) -> Result<Option<PhaseRecord>, DomainError> {
        let row = sqlx::query("SELECT id, project_id, progress FROM phases WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to fetch phase: {}", e)))?;

        Ok(row.as_ref().map(row_to_phase))
    }

    async fn find_project(&self, id: ProjectId) -> Result<Option<ProjectRecord>, DomainError> {
        let row = sqlx::query("SELECT id, name FROM projects WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(&format!("Failed to fetch project: {}", e)))?;

        Ok(row.map(|r| ProjectRecord {
            id: ProjectId::new(r.get("id")),
            name: r.get("name"),
        }))
    }

    async fn apply_progress(
        &self,
        event_id: &EventId,
        original: &PhaseRecord,
        progress: Progress,
    ) -> Result<ProgressAdvance, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error(&format!("Failed to begin transaction: {}", e)))?;

        let recorded = sqlx::query(
            "SELECT original_progress, updated_progress FROM phase_progress_events WHERE event_id = $1",
        )
        .bind(event_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error(&format!("Failed to fetch applied progress: {}", e)))?;

        if let Some(row) = recorded {
            return Ok(ProgressAdvance {
                original: original.with_progress(Progress::new(row.get("original_progress"))),
                updated: original.with_progress(Progress::new(row.get("updated_progress"))),
                replayed: true,
            });
        }

        let row = sqlx::query(
            r#"
            UPDATE phases SET progress = $2
            WHERE id = $1
            RETURNING id, project_id, progress
            "#,
        )
        .bind(original.id.value())
        .bind(progress.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error(&format!("Failed to update phase progress: {}", e)))?;

        let updated = row.as_ref().map(row_to_phase).ok_or_else(|| {
            DomainError::new(ErrorCode::PhaseNotFound, "Phase not found")
                .with_detail("phase_id", original.id.to_string())
        })?;

        sqlx::query(
            r#"
            INSERT INTO phase_progress_events (event_id, phase_id, original_progress, updated_progress)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(event_id.as_str())
        .bind(original.id.value())
        .bind(original.progress.value())
        .bind(updated.progress.value())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error(&format!("Failed to record applied progress: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| db_error(&format!("Failed to commit progress: {}", e)))?;

        Ok(ProgressAdvance {
            original: original.clone(),
            updated,
            replayed: false,
        })
    }
}

fn row_to_phase(row: &PgRow) -> PhaseRecord {
    PhaseRecord {
        id: PhaseId::new(row.get("id")),
        project_id: ProjectId::new(row.get("project_id")),
        progress: Progress::new(row.get("progress")),
    }
}

fn db_error(msg: &str) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, msg.to_string())
}
