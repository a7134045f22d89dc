//! UpdateMilestoneHandler - Folds `MilestoneUpdated` events into the timeline.

use async_trait::async_trait;
use tracing::{field, info, info_span, Instrument, Span};

use crate::domain::foundation::{DomainError, MilestoneId, TimelineId};
use crate::domain::timeline::{decode_payload, MilestonePatch, MilestoneUpdated};
use crate::ports::{Delivery, HandlerOutcome, QueueHandler};

use super::{log_failure, TimelineStore};

/// Merges updated fields onto a milestone and applies any cascaded sibling updates.
///
/// Other milestones are never renumbered here, even when the update changes
/// the primary milestone's order. The producer sends sibling reorders as
/// cascaded updates.
pub struct UpdateMilestoneHandler {
    timelines: TimelineStore,
}

impl UpdateMilestoneHandler {
    pub fn new(timelines: TimelineStore) -> Self {
        Self { timelines }
    }

    pub async fn update_milestone(
        &self,
        timeline_id: TimelineId,
        milestone_id: MilestoneId,
        updated: &MilestonePatch,
        cascaded: &[MilestonePatch],
    ) -> Result<(), DomainError> {
        let mut timeline = self.timelines.load(timeline_id).await?;

        let summary = timeline
            .document
            .update_milestone(milestone_id, updated, cascaded)?;
        self.timelines.save(&timeline).await?;

        info!(
            timeline_id = %timeline_id,
            milestone_id = %milestone_id,
            cascaded = summary.cascaded.len(),
            skipped = summary.skipped.len(),
            "Milestone updated in timeline"
        );
        Ok(())
    }

    async fn apply(&self, payload: &[u8]) -> Result<(), DomainError> {
        let event: MilestoneUpdated = decode_payload(payload)?;
        Span::current()
            .record("timeline_id", field::display(event.timeline_id()))
            .record("milestone_id", field::display(event.milestone_id()));

        self.update_milestone(
            event.timeline_id(),
            event.milestone_id(),
            &event.updated,
            event.cascaded_milestones(),
        )
        .await
    }
}

#[async_trait]
impl QueueHandler for UpdateMilestoneHandler {
    async fn handle(&self, delivery: &Delivery) -> HandlerOutcome {
        let span = info_span!(
            "milestone_updated",
            timeline_id = field::Empty,
            milestone_id = field::Empty,
        );
        let result = self.apply(&delivery.payload).instrument(span.clone()).await;
        let _entered = span.enter();
        log_failure(self.name(), delivery, result)
    }

    fn name(&self) -> &'static str {
        "UpdateMilestoneHandler"
    }
}
