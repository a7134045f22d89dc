//! Relational records read by the cascade processor.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PhaseId, ProductId, Progress, ProjectId};

/// A product; product-backed timelines reference one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub phase_id: PhaseId,
}

/// A project phase and its completion percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRecord {
    pub id: PhaseId,
    pub project_id: ProjectId,
    pub progress: Progress,
}

impl PhaseRecord {
    /// Returns a copy of this phase with a different progress value.
    pub fn with_progress(&self, progress: Progress) -> Self {
        Self {
            progress,
            ..self.clone()
        }
    }
}

/// A progress change as applied for one triggering event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressAdvance {
    /// Phase before the change.
    pub original: PhaseRecord,
    /// Phase after the change.
    pub updated: PhaseRecord,
    /// True when the change was recorded by an earlier attempt at the same
    /// event and nothing was written this time.
    pub replayed: bool,
}

/// A project, the root of the product → phase → project chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
}
