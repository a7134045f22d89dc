//! The timeline document and the pure transformations applied to it.
//!
//! Every lifecycle event maps onto exactly one of:
//!
//! | Event    | Transformation        | Touches other records' `order` |
//! |----------|-----------------------|--------------------------------|
//! | Added    | `insert_milestone`    | yes, shift-right from `order`  |
//! | Updated  | `update_milestone`    | never                          |
//! | Removed  | `remove_milestone`    | never (gaps allowed)           |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::foundation::{MilestoneId, ValidationError};

use super::{MilestonePatch, MilestoneRecord, TimelineError};

/// Result of inserting a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The milestone was added and later siblings shifted.
    Inserted { shifted: usize },
    /// A record with the same id is already present; nothing changed.
    AlreadyPresent,
}

/// Result of applying an update event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Siblings that received a cascaded merge.
    pub cascaded: Vec<MilestoneId>,
    /// Cascaded entries whose sibling is no longer in the timeline.
    pub skipped: Vec<MilestoneId>,
}

/// Document-store record holding a timeline's milestone list.
///
/// Fields other than `milestones` belong to other writers and are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineDocument {
    #[serde(default)]
    pub milestones: Vec<MilestoneRecord>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TimelineDocument {
    /// Creates a document holding only the given milestones.
    pub fn with_milestones(milestones: Vec<MilestoneRecord>) -> Self {
        Self {
            milestones,
            fields: Map::new(),
        }
    }

    /// Returns the milestone with the given id.
    pub fn milestone(&self, id: MilestoneId) -> Option<&MilestoneRecord> {
        self.milestones.iter().find(|m| m.id == id)
    }

    /// Returns true if a milestone with the given id is present.
    pub fn contains(&self, id: MilestoneId) -> bool {
        self.milestone(id).is_some()
    }

    /// Inserts a milestone at its `order`, shifting every record at or after
    /// that position one step later.
    pub fn insert_milestone(
        &mut self,
        milestone: MilestoneRecord,
    ) -> Result<Insertion, TimelineError> {
        if milestone.order <= 0 {
            return Err(ValidationError::not_positive("order", milestone.order).into());
        }
        if self.contains(milestone.id) {
            return Ok(Insertion::AlreadyPresent);
        }

        let mut shifted = 0;
        for existing in self
            .milestones
            .iter_mut()
            .filter(|m| m.order >= milestone.order)
        {
            existing.order += 1;
            shifted += 1;
        }
        self.milestones.push(milestone);

        Ok(Insertion::Inserted { shifted })
    }

    /// Merges `patch` onto milestone `id`, then each cascaded patch onto its sibling.
    ///
    /// Orders of other milestones are left alone even when the patch moves `id`.
    pub fn update_milestone(
        &mut self,
        id: MilestoneId,
        patch: &MilestonePatch,
        cascaded: &[MilestonePatch],
    ) -> Result<UpdateSummary, TimelineError> {
        let primary = self
            .milestones
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TimelineError::MilestoneNotFound { milestone_id: id })?;
        primary.merge(patch)?;

        let mut summary = UpdateSummary::default();
        for sibling_patch in cascaded {
            let Some(sibling_id) = sibling_patch.id() else {
                return Err(ValidationError::invalid_format(
                    "cascadedUpdates.milestones",
                    "entry without an id",
                )
                .into());
            };
            match self.milestones.iter_mut().find(|m| m.id == sibling_id) {
                Some(sibling) => {
                    sibling.merge(sibling_patch)?;
                    summary.cascaded.push(sibling_id);
                }
                None => {
                    warn!(milestone_id = %sibling_id, "Cascaded update targets a milestone missing from the timeline");
                    summary.skipped.push(sibling_id);
                }
            }
        }

        Ok(summary)
    }

    /// Drops milestone `id`. Returns whether a record was removed.
    pub fn remove_milestone(&mut self, id: MilestoneId) -> bool {
        let before = self.milestones.len();
        self.milestones.retain(|m| m.id != id);
        self.milestones.len() != before
    }

    /// Returns the partial document written back to the store.
    ///
    /// Always the complete milestone list, never a patch path.
    pub fn milestones_update(&self) -> Result<Value, serde_json::Error> {
        let milestones = serde_json::to_value(&self.milestones)?;
        let mut doc = Map::new();
        doc.insert("milestones".to_string(), milestones);
        Ok(Value::Object(doc))
    }
}
