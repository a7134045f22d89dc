//! The milestone status-change event and the decision it drives.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::domain::foundation::{MilestoneId, ProductId, ProjectId, UserId, ValidationError};
use crate::domain::timeline::MilestoneStatus;

/// What a timeline is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimelineReference {
    Product,
    Other(String),
}

impl From<String> for TimelineReference {
    fn from(raw: String) -> Self {
        if raw == "product" {
            TimelineReference::Product
        } else {
            TimelineReference::Other(raw)
        }
    }
}

impl From<TimelineReference> for String {
    fn from(reference: TimelineReference) -> Self {
        match reference {
            TimelineReference::Product => "product".to_string(),
            TimelineReference::Other(raw) => raw,
        }
    }
}

impl fmt::Display for TimelineReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineReference::Product => write!(f, "product"),
            TimelineReference::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Timeline block of a status-change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSummary {
    pub reference: TimelineReference,

    #[serde(default)]
    pub reference_id: Option<i64>,

    /// Total duration of the timeline, in the same unit as milestone durations.
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Milestone snapshot carried on either side of a status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSnapshot {
    #[serde(default)]
    pub id: Option<MilestoneId>,

    #[serde(default)]
    pub status: MilestoneStatus,

    #[serde(default)]
    pub duration: Option<f64>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// A milestone changed status. Validated against its schema before decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeEvent {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub initiator_user_id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,

    pub timeline: TimelineSummary,
    pub original_milestone: MilestoneSnapshot,
    pub updated_milestone: MilestoneSnapshot,
}

/// What a status change means for the owning phase's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    /// The change is not a transition into `completed`.
    NotACompletion,
    /// The timeline or milestone has no usable duration.
    MissingDuration,
    /// The phase advances by `milestone_duration / timeline_duration`.
    Share {
        milestone_duration: f64,
        timeline_duration: f64,
    },
}

impl StatusChangeEvent {
    /// Product the timeline is attached to.
    ///
    /// `None` when the timeline is not product-backed. A product-backed
    /// timeline without a valid `referenceId` is invalid.
    pub fn product_reference(&self) -> Result<Option<ProductId>, ValidationError> {
        if self.timeline.reference != TimelineReference::Product {
            return Ok(None);
        }
        let raw_product = self.timeline.reference_id.ok_or_else(|| {
            ValidationError::invalid_format(
                "timeline.referenceId",
                "required for product-backed timelines",
            )
        })?;
        Ok(Some(ProductId::try_new(raw_product)?))
    }

    /// Checks the status transition and the durations it would advance by.
    pub fn completion(&self) -> Completion {
        if !self
            .original_milestone
            .status
            .completes_with(&self.updated_milestone.status)
        {
            return Completion::NotACompletion;
        }

        let timeline_duration = match self.timeline.duration {
            Some(d) if d > 0.0 => d,
            _ => return Completion::MissingDuration,
        };
        let Some(milestone_duration) = self.updated_milestone.duration else {
            return Completion::MissingDuration;
        };

        Completion::Share {
            milestone_duration,
            timeline_duration,
        }
    }
}
