//! Lifecycle events published by the relational side when a milestone changes.
//!
//! These arrive as JSON bytes on the bus; field names follow the producer's
//! camelCase convention.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{DomainError, MilestoneId, TimelineId};

use super::{MilestonePatch, MilestoneRecord};

/// A milestone was created. Carries the full record plus its timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneAdded {
    #[serde(rename = "timelineId")]
    pub timeline_id: TimelineId,

    #[serde(flatten)]
    pub milestone: MilestoneRecord,
}

/// The `original` half of an update event: identity plus the pre-update row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalMilestone {
    pub id: MilestoneId,

    #[serde(rename = "timelineId")]
    pub timeline_id: TimelineId,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Ripple effects of an update on sibling milestones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadedUpdates {
    #[serde(default)]
    pub milestones: Vec<MilestonePatch>,
}

/// A milestone was updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneUpdated {
    pub original: OriginalMilestone,

    pub updated: MilestonePatch,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascaded_updates: Option<CascadedUpdates>,
}

impl MilestoneUpdated {
    pub fn timeline_id(&self) -> TimelineId {
        self.original.timeline_id
    }

    pub fn milestone_id(&self) -> MilestoneId {
        self.original.id
    }

    /// Sibling patches carried by the event; empty when none were sent.
    pub fn cascaded_milestones(&self) -> &[MilestonePatch] {
        self.cascaded_updates
            .as_ref()
            .map(|c| c.milestones.as_slice())
            .unwrap_or(&[])
    }
}

/// A milestone was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRemoved {
    pub id: MilestoneId,
    pub timeline_id: TimelineId,
}

/// Decodes a lifecycle payload, mapping any decode failure to a malformed-message error.
pub fn decode_payload<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, DomainError> {
    serde_json::from_slice(bytes).map_err(|e| DomainError::malformed(e.to_string()))
}
