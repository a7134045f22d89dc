//! Timeline-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, MilestoneId, TimelineId, ValidationError};

/// Errors raised while transforming a timeline document.
#[derive(Debug, Clone, Error)]
pub enum TimelineError {
    #[error("Timeline not found: {0}")]
    NotFound(TimelineId),

    #[error("Milestone {milestone_id} not found in timeline")]
    MilestoneNotFound { milestone_id: MilestoneId },

    #[error("Invalid milestone: {0}")]
    Invalid(#[from] ValidationError),
}

impl TimelineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TimelineError::NotFound(_) => ErrorCode::TimelineNotFound,
            TimelineError::MilestoneNotFound { .. } => ErrorCode::MilestoneNotFound,
            TimelineError::Invalid(_) => ErrorCode::ValidationFailed,
        }
    }
}

impl From<TimelineError> for DomainError {
    fn from(err: TimelineError) -> Self {
        let code = err.code();
        let domain = DomainError::new(code, err.to_string());
        match err {
            TimelineError::NotFound(id) => domain.with_detail("timeline_id", id.to_string()),
            TimelineError::MilestoneNotFound { milestone_id } => {
                domain.with_detail("milestone_id", milestone_id.to_string())
            }
            TimelineError::Invalid(_) => domain,
        }
    }
}
