//! Integration tests for the milestone lifecycle consumers.
//!
//! These tests drive deliveries through the dispatcher exactly as a broker
//! consumer would:
//! 1. A delivery arrives on one of the lifecycle queues
//! 2. The bound handler folds the event into the timeline document
//! 3. The dispatcher settles the delivery (ack, requeue, or reject)
//!
//! Uses in-memory implementations to test the flow without external dependencies.

use serde_json::{json, Value};
use std::sync::Arc;

use timeline_sync::adapters::{
    ChannelCall, InMemoryDocumentStore, InMemoryEventBus, InMemoryPhaseRepository,
    InMemoryProcessedEventStore, QueueDispatcher, RecordingChannel, Settlement,
    StatusChangeValidator,
};
use timeline_sync::bootstrap::{wire, Ports};
use timeline_sync::config::{
    AppConfig, ConsumerConfig, DatabaseConfig, DocumentStoreConfig, RedisConfig, ServiceConfig,
};
use timeline_sync::ports::Delivery;

// =============================================================================
// Test Infrastructure
// =============================================================================

const INDEX: &str = "timelines";

struct Harness {
    store: Arc<InMemoryDocumentStore>,
    channel: RecordingChannel,
    dispatcher: QueueDispatcher,
    next_tag: std::cell::Cell<u64>,
}

impl Harness {
    fn new(optimistic_concurrency: bool) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.insert(
            INDEX,
            "3",
            json!({
                "title": "Launch plan",
                "milestones": [
                    {"id": 1, "order": 1, "status": "completed", "name": "Kickoff"},
                    {"id": 2, "order": 2, "status": "active", "name": "Build"},
                    {"id": 3, "order": 3, "status": "active", "name": "Ship"}
                ]
            }),
        );

        let config = AppConfig {
            service: ServiceConfig::default(),
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            document_store: DocumentStoreConfig {
                timeline_index: INDEX.to_string(),
                optimistic_concurrency,
                ..Default::default()
            },
            consumer: ConsumerConfig::default(),
        };
        let bus = Arc::new(InMemoryEventBus::new());
        let ports = Ports {
            documents: store.clone(),
            phases: Arc::new(InMemoryPhaseRepository::new()),
            processed_events: Arc::new(InMemoryProcessedEventStore::new()),
            validator: Arc::new(StatusChangeValidator::new()),
        };
        let dispatcher = wire(&config, ports, bus.clone(), bus.as_ref());

        Self {
            store,
            channel: RecordingChannel::new(),
            dispatcher,
            next_tag: std::cell::Cell::new(1),
        }
    }

    fn delivery(&self, queue: &str, payload: Value) -> Delivery {
        let tag = self.next_tag.get();
        self.next_tag.set(tag + 1);
        Delivery::new(queue, tag, serde_json::to_vec(&payload).unwrap())
    }

    async fn send(&self, delivery: &Delivery) -> Settlement {
        self.dispatcher
            .dispatch(delivery, &self.channel)
            .await
            .unwrap()
    }

    fn milestones(&self) -> Vec<Value> {
        self.store.document(INDEX, "3").unwrap()["milestones"]
            .as_array()
            .unwrap()
            .clone()
    }

    fn ids_and_orders(&self) -> Vec<(i64, i64)> {
        self.milestones()
            .iter()
            .map(|m| (m["id"].as_i64().unwrap(), m["order"].as_i64().unwrap()))
            .collect()
    }
}

// =============================================================================
// Lifecycle Flow
// =============================================================================

#[tokio::test]
async fn add_update_remove_flow_keeps_document_in_sync() {
    let harness = Harness::new(true);

    let add = harness.delivery(
        "milestone.added",
        json!({"id": 9, "timelineId": 3, "order": 2, "status": "active", "name": "Beta"}),
    );
    assert_eq!(harness.send(&add).await, Settlement::Acked);
    let mut ids = harness.ids_and_orders();
    ids.sort();
    assert_eq!(ids, vec![(1, 1), (2, 3), (3, 4), (9, 2)]);

    let update = harness.delivery(
        "milestone.updated",
        json!({
            "original": {"id": 9, "timelineId": 3, "order": 2, "status": "active"},
            "updated": {"status": "completed", "name": "Beta (done)"},
            "cascadedUpdates": {"milestones": [{"id": 2, "startDate": "2024-02-01"}]}
        }),
    );
    assert_eq!(harness.send(&update).await, Settlement::Acked);
    let milestones = harness.milestones();
    let beta = milestones.iter().find(|m| m["id"] == 9).unwrap();
    assert_eq!(beta["status"], "completed");
    assert_eq!(beta["name"], "Beta (done)");
    let build = milestones.iter().find(|m| m["id"] == 2).unwrap();
    assert_eq!(build["startDate"], "2024-02-01");
    assert_eq!(build["order"], 3);

    let remove = harness.delivery("milestone.removed", json!({"id": 2, "timelineId": 3}));
    assert_eq!(harness.send(&remove).await, Settlement::Acked);
    let mut ids = harness.ids_and_orders();
    ids.sort();
    // No renumbering after removal; order 3 is now a gap.
    assert_eq!(ids, vec![(1, 1), (3, 4), (9, 2)]);

    assert_eq!(
        harness.channel.calls(),
        vec![
            ChannelCall::Ack { delivery_tag: 1 },
            ChannelCall::Ack { delivery_tag: 2 },
            ChannelCall::Ack { delivery_tag: 3 },
        ]
    );

    let document = harness.store.document(INDEX, "3").unwrap();
    assert_eq!(document["title"], "Launch plan");
}

// =============================================================================
// Settlement Rules
// =============================================================================

#[tokio::test]
async fn retryable_failure_is_requeued_once_then_dead_lettered() {
    let harness = Harness::new(true);
    let payload = json!({"id": 9, "timelineId": 404, "order": 1, "status": "active"});

    let first = harness.delivery("milestone.added", payload.clone());
    assert_eq!(harness.send(&first).await, Settlement::Requeued);

    let second = harness.delivery("milestone.added", payload).redelivered();
    assert_eq!(harness.send(&second).await, Settlement::Rejected);

    assert_eq!(
        harness.channel.calls(),
        vec![
            ChannelCall::Nack {
                delivery_tag: 1,
                multiple: false,
                requeue: true
            },
            ChannelCall::Nack {
                delivery_tag: 2,
                multiple: false,
                requeue: false
            },
        ]
    );
}

#[tokio::test]
async fn malformed_payload_is_rejected_without_requeue() {
    let harness = Harness::new(true);
    let delivery = Delivery::new("milestone.removed", 1, b"{not json".to_vec());

    assert_eq!(harness.send(&delivery).await, Settlement::Rejected);
    assert_eq!(harness.store.write_count(), 0);
    assert_eq!(
        harness.channel.calls(),
        vec![ChannelCall::Nack {
            delivery_tag: 1,
            multiple: false,
            requeue: false
        }]
    );
}

#[tokio::test]
async fn update_of_unknown_milestone_is_requeued() {
    let harness = Harness::new(true);
    let delivery = harness.delivery(
        "milestone.updated",
        json!({
            "original": {"id": 77, "timelineId": 3},
            "updated": {"status": "completed"}
        }),
    );

    assert_eq!(harness.send(&delivery).await, Settlement::Requeued);
    assert_eq!(harness.store.write_count(), 0);
}

#[tokio::test]
async fn unbound_queue_is_rejected() {
    let harness = Harness::new(true);
    let delivery = harness.delivery("milestone.archived", json!({"id": 1}));

    assert_eq!(harness.send(&delivery).await, Settlement::Rejected);
}

#[tokio::test]
async fn channel_failure_is_returned_to_the_consumer() {
    let harness = Harness::new(true);
    harness.channel.fail_next("connection reset");
    let delivery = harness.delivery("milestone.removed", json!({"id": 1, "timelineId": 3}));

    let result = harness.dispatcher.dispatch(&delivery, &harness.channel).await;

    assert!(result.is_err());
    assert!(harness.channel.calls().is_empty());
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_write_between_read_and_save_is_requeued() {
    let harness = Harness::new(true);
    harness.store.bump_version_on_next_read(INDEX, "3");
    let delivery = harness.delivery("milestone.removed", json!({"id": 1, "timelineId": 3}));

    assert_eq!(harness.send(&delivery).await, Settlement::Requeued);
    assert_eq!(harness.milestones().len(), 3);

    // The redelivery reads the fresh version and applies cleanly.
    let retry = harness
        .delivery("milestone.removed", json!({"id": 1, "timelineId": 3}))
        .redelivered();
    assert_eq!(harness.send(&retry).await, Settlement::Acked);
    assert_eq!(harness.milestones().len(), 2);
}

#[tokio::test]
async fn last_write_wins_when_optimistic_concurrency_is_off() {
    let harness = Harness::new(false);
    harness.store.bump_version_on_next_read(INDEX, "3");
    let delivery = harness.delivery("milestone.removed", json!({"id": 1, "timelineId": 3}));

    assert_eq!(harness.send(&delivery).await, Settlement::Acked);
    assert_eq!(harness.milestones().len(), 2);
}

// =============================================================================
// Redelivery Suppression
// =============================================================================

#[tokio::test]
async fn redelivered_add_is_acknowledged_without_second_shift() {
    let harness = Harness::new(true);
    let payload = json!({"id": 9, "timelineId": 3, "order": 2, "status": "active"});

    let first = harness.delivery("milestone.added", payload.clone());
    assert_eq!(harness.send(&first).await, Settlement::Acked);
    let after_first = harness.ids_and_orders();

    let again = harness.delivery("milestone.added", payload).redelivered();
    assert_eq!(harness.send(&again).await, Settlement::Acked);

    assert_eq!(harness.ids_and_orders(), after_first);
    // One write per successful event, even when nothing changed.
    assert_eq!(harness.store.write_count(), 2);
}

#[tokio::test]
async fn remove_of_absent_milestone_writes_once() {
    let harness = Harness::new(true);
    let delivery = harness.delivery("milestone.removed", json!({"id": 404, "timelineId": 3}));

    assert_eq!(harness.send(&delivery).await, Settlement::Acked);
    assert_eq!(harness.milestones().len(), 3);
    assert_eq!(harness.store.write_count(), 1);
}
