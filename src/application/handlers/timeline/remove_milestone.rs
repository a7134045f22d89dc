//! RemoveMilestoneHandler - Folds `MilestoneRemoved` events into the timeline.

use async_trait::async_trait;
use tracing::{debug, field, info, info_span, Instrument, Span};

use crate::domain::foundation::{DomainError, MilestoneId, TimelineId};
use crate::domain::timeline::{decode_payload, MilestoneRemoved};
use crate::ports::{Delivery, HandlerOutcome, QueueHandler};

use super::{log_failure, TimelineStore};

/// Drops a milestone from its timeline. Remaining orders are not compacted.
pub struct RemoveMilestoneHandler {
    timelines: TimelineStore,
}

impl RemoveMilestoneHandler {
    pub fn new(timelines: TimelineStore) -> Self {
        Self { timelines }
    }

    /// Removes `milestone_id` from timeline `timeline_id`.
    ///
    /// The filtered list is written back even when nothing matched.
    pub async fn remove_milestone(
        &self,
        timeline_id: TimelineId,
        milestone_id: MilestoneId,
    ) -> Result<(), DomainError> {
        let mut timeline = self.timelines.load(timeline_id).await?;

        let removed = timeline.document.remove_milestone(milestone_id);
        if !removed {
            debug!(
                timeline_id = %timeline_id,
                milestone_id = %milestone_id,
                "Milestone not present in timeline"
            );
        }
        self.timelines.save(&timeline).await?;

        info!(
            timeline_id = %timeline_id,
            milestone_id = %milestone_id,
            removed,
            "Milestone removed from timeline"
        );
        Ok(())
    }

    async fn apply(&self, payload: &[u8]) -> Result<(), DomainError> {
        let event: MilestoneRemoved = decode_payload(payload)?;
        Span::current()
            .record("timeline_id", field::display(event.timeline_id))
            .record("milestone_id", field::display(event.id));

        self.remove_milestone(event.timeline_id, event.id).await
    }
}

#[async_trait]
impl QueueHandler for RemoveMilestoneHandler {
    async fn handle(&self, delivery: &Delivery) -> HandlerOutcome {
        let span = info_span!(
            "milestone_removed",
            timeline_id = field::Empty,
            milestone_id = field::Empty,
        );
        let result = self.apply(&delivery.payload).instrument(span.clone()).await;
        let _entered = span.enter();
        log_failure(self.name(), delivery, result)
    }

    fn name(&self) -> &'static str {
        "RemoveMilestoneHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDocumentStore;
    use crate::domain::foundation::ErrorCode;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn seeded_store() -> Arc<InMemoryDocumentStore> {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.insert(
            "timelines",
            "3",
            json!({
                "milestones": [
                    {"id": 1, "order": 1, "status": "active"},
                    {"id": 2, "order": 2, "status": "active"},
                    {"id": 3, "order": 3, "status": "active"}
                ]
            }),
        );
        store
    }

    fn handler(store: &Arc<InMemoryDocumentStore>) -> RemoveMilestoneHandler {
        RemoveMilestoneHandler::new(TimelineStore::new(store.clone(), "timelines"))
    }

    fn removed(value: Value) -> Delivery {
        Delivery::new("milestone.removed", 1, serde_json::to_vec(&value).unwrap())
    }

    fn orders(store: &InMemoryDocumentStore) -> Vec<(i64, i64)> {
        store
            .document("timelines", "3")
            .and_then(|doc| doc["milestones"].as_array().cloned())
            .unwrap_or_default()
            .iter()
            .map(|m| (m["id"].as_i64().unwrap(), m["order"].as_i64().unwrap()))
            .collect()
    }

    #[tokio::test]
    async fn handler_name_is_correct() {
        let store = seeded_store();
        assert_eq!(handler(&store).name(), "RemoveMilestoneHandler");
    }

    #[tokio::test]
    async fn removes_without_renumbering() {
        let store = seeded_store();

        let outcome = handler(&store)
            .handle(&removed(json!({"id": 2, "timelineId": 3})))
            .await;

        assert!(outcome.is_success());
        assert_eq!(orders(&store), vec![(1, 1), (3, 3)]);
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn absent_milestone_still_writes_and_succeeds() {
        let store = seeded_store();

        let outcome = handler(&store)
            .handle(&removed(json!({"id": 9, "timelineId": 3})))
            .await;

        assert!(outcome.is_success());
        assert_eq!(store.write_count(), 1);
        assert_eq!(orders(&store), vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[tokio::test]
    async fn missing_timeline_is_retryable() {
        let store = seeded_store();

        let outcome = handler(&store)
            .handle(&removed(json!({"id": 2, "timelineId": 8})))
            .await;

        match outcome {
            HandlerOutcome::RetryableFailure(e) => assert_eq!(e.code, ErrorCode::TimelineNotFound),
            other => panic!("unexpected outcome: {}", other),
        }
    }

    #[tokio::test]
    async fn string_ids_are_malformed() {
        let store = seeded_store();

        let outcome = handler(&store)
            .handle(&removed(json!({"id": "two", "timelineId": 3})))
            .await;

        assert!(matches!(outcome, HandlerOutcome::TerminalFailure(_)));
        assert_eq!(store.write_count(), 0);
    }
}
