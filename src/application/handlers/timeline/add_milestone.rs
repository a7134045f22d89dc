//! AddMilestoneHandler - Folds `MilestoneAdded` events into the timeline.

use async_trait::async_trait;
use tracing::{debug, field, info, info_span, Instrument, Span};

use crate::domain::foundation::{DomainError, TimelineId};
use crate::domain::timeline::{decode_payload, Insertion, MilestoneAdded, MilestoneRecord};
use crate::ports::{Delivery, HandlerOutcome, QueueHandler};

use super::{log_failure, TimelineStore};

/// Inserts a new milestone at its position, shifting later milestones right.
pub struct AddMilestoneHandler {
    timelines: TimelineStore,
}

impl AddMilestoneHandler {
    pub fn new(timelines: TimelineStore) -> Self {
        Self { timelines }
    }

    /// Adds `milestone` to timeline `timeline_id`.
    ///
    /// A milestone whose id is already present was applied by an earlier
    /// delivery of the same event; the document is written back unchanged.
    pub async fn add_milestone(
        &self,
        timeline_id: TimelineId,
        milestone: MilestoneRecord,
    ) -> Result<(), DomainError> {
        let milestone_id = milestone.id;
        let order = milestone.order;
        let mut timeline = self.timelines.load(timeline_id).await?;

        let insertion = timeline.document.insert_milestone(milestone)?;
        self.timelines.save(&timeline).await?;

        match insertion {
            Insertion::AlreadyPresent => debug!(
                timeline_id = %timeline_id,
                milestone_id = %milestone_id,
                "Milestone already in timeline, nothing shifted"
            ),
            Insertion::Inserted { shifted } => info!(
                timeline_id = %timeline_id,
                milestone_id = %milestone_id,
                order,
                shifted,
                "Milestone added to timeline"
            ),
        }
        Ok(())
    }

    async fn apply(&self, payload: &[u8]) -> Result<(), DomainError> {
        let event: MilestoneAdded = decode_payload(payload)?;
        Span::current()
            .record("timeline_id", field::display(event.timeline_id))
            .record("milestone_id", field::display(event.milestone.id));

        self.add_milestone(event.timeline_id, event.milestone).await
    }
}

#[async_trait]
impl QueueHandler for AddMilestoneHandler {
    async fn handle(&self, delivery: &Delivery) -> HandlerOutcome {
        let span = info_span!(
            "milestone_added",
            timeline_id = field::Empty,
            milestone_id = field::Empty,
        );
        let result = self.apply(&delivery.payload).instrument(span.clone()).await;
        let _entered = span.enter();
        log_failure(self.name(), delivery, result)
    }

    fn name(&self) -> &'static str {
        "AddMilestoneHandler"
    }
}
