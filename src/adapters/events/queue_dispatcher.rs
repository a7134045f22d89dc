//! QueueDispatcher - Routes deliveries to queue handlers and settles them.
//!
//! The dispatcher is the only place that acknowledges messages:
//!
//! | Outcome            | Channel call                                  |
//! |--------------------|-----------------------------------------------|
//! | `Success`          | `ack`                                         |
//! | `RetryableFailure` | `nack(multiple = false, requeue = !redelivered)` |
//! | `TerminalFailure`  | `nack(multiple = false, requeue = false)`     |
//!
//! A retryable failure is therefore requeued once; the second failure goes
//! to the bus's dead-letter path.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Delivery, HandlerOutcome, MessageChannel, QueueHandler};

/// How a delivery was settled on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Acked,
    Requeued,
    Rejected,
}

/// Maps queue names to handlers.
#[derive(Default)]
pub struct QueueDispatcher {
    routes: HashMap<String, Arc<dyn QueueHandler>>,
}

impl QueueDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `queue`, replacing any previous binding.
    pub fn route(mut self, queue: impl Into<String>, handler: Arc<dyn QueueHandler>) -> Self {
        self.routes.insert(queue.into(), handler);
        self
    }

    pub fn queues(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Runs the bound handler and settles the delivery on `channel`.
    ///
    /// Only channel failures are returned; handler failures are settled as nacks.
    pub async fn dispatch(
        &self,
        delivery: &Delivery,
        channel: &dyn MessageChannel,
    ) -> Result<Settlement, DomainError> {
        let outcome = match self.routes.get(&delivery.queue) {
            Some(handler) => handler.handle(delivery).await,
            None => HandlerOutcome::TerminalFailure(
                DomainError::new(ErrorCode::ChannelError, "No handler bound to queue")
                    .with_detail("queue", delivery.queue.clone()),
            ),
        };

        let settlement = settlement_for(&outcome, delivery.redelivered);
        let result = match settlement {
            Settlement::Acked => channel.ack(delivery).await,
            Settlement::Requeued => channel.nack(delivery, false, true).await,
            Settlement::Rejected => channel.nack(delivery, false, false).await,
        };

        if let Err(e) = result {
            error!(
                queue = %delivery.queue,
                delivery_tag = delivery.delivery_tag,
                error = %e,
                "Failed to settle delivery"
            );
            return Err(e);
        }

        match settlement {
            Settlement::Acked => debug!(
                queue = %delivery.queue,
                delivery_tag = delivery.delivery_tag,
                "Delivery acknowledged"
            ),
            _ => warn!(
                queue = %delivery.queue,
                delivery_tag = delivery.delivery_tag,
                redelivered = delivery.redelivered,
                requeue = settlement == Settlement::Requeued,
                outcome = %outcome,
                "Delivery rejected"
            ),
        }

        Ok(settlement)
    }
}

fn settlement_for(outcome: &HandlerOutcome, redelivered: bool) -> Settlement {
    match outcome {
        HandlerOutcome::Success => Settlement::Acked,
        HandlerOutcome::RetryableFailure(_) if !redelivered => Settlement::Requeued,
        HandlerOutcome::RetryableFailure(_) | HandlerOutcome::TerminalFailure(_) => {
            Settlement::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ChannelCall, RecordingChannel};
    use async_trait::async_trait;

    struct FixedHandler(fn() -> HandlerOutcome);

    #[async_trait]
    impl QueueHandler for FixedHandler {
        async fn handle(&self, _: &Delivery) -> HandlerOutcome {
            (self.0)()
        }

        fn name(&self) -> &'static str {
            "FixedHandler"
        }
    }

    fn retryable() -> HandlerOutcome {
        HandlerOutcome::RetryableFailure(DomainError::new(ErrorCode::DocumentStoreError, "down"))
    }

    fn terminal() -> HandlerOutcome {
        HandlerOutcome::TerminalFailure(DomainError::malformed("bad json"))
    }

    fn dispatcher(outcome: fn() -> HandlerOutcome) -> QueueDispatcher {
        QueueDispatcher::new().route("milestone.added", Arc::new(FixedHandler(outcome)))
    }

    fn delivery() -> Delivery {
        Delivery::new("milestone.added", 7, b"{}".to_vec())
    }

    #[tokio::test]
    async fn success_is_acked() {
        let channel = RecordingChannel::new();

        let settlement = dispatcher(|| HandlerOutcome::Success)
            .dispatch(&delivery(), &channel)
            .await
            .unwrap();

        assert_eq!(settlement, Settlement::Acked);
        assert_eq!(channel.calls(), vec![ChannelCall::Ack { delivery_tag: 7 }]);
    }

    #[tokio::test]
    async fn first_retryable_failure_is_requeued() {
        let channel = RecordingChannel::new();

        dispatcher(retryable).dispatch(&delivery(), &channel).await.unwrap();

        assert_eq!(
            channel.calls(),
            vec![ChannelCall::Nack {
                delivery_tag: 7,
                multiple: false,
                requeue: true
            }]
        );
    }

    #[tokio::test]
    async fn retryable_failure_on_redelivery_is_not_requeued() {
        let channel = RecordingChannel::new();

        let settlement = dispatcher(retryable)
            .dispatch(&delivery().redelivered(), &channel)
            .await
            .unwrap();

        assert_eq!(settlement, Settlement::Rejected);
        assert_eq!(
            channel.calls(),
            vec![ChannelCall::Nack {
                delivery_tag: 7,
                multiple: false,
                requeue: false
            }]
        );
    }

    #[tokio::test]
    async fn terminal_failure_is_never_requeued() {
        let channel = RecordingChannel::new();

        let settlement = dispatcher(terminal)
            .dispatch(&delivery(), &channel)
            .await
            .unwrap();

        assert_eq!(settlement, Settlement::Rejected);
    }

    #[tokio::test]
    async fn unknown_queue_is_rejected() {
        let channel = RecordingChannel::new();
        let unrouted = Delivery::new("milestone.archived", 3, b"{}".to_vec());

        let settlement = dispatcher(|| HandlerOutcome::Success)
            .dispatch(&unrouted, &channel)
            .await
            .unwrap();

        assert_eq!(settlement, Settlement::Rejected);
    }

    #[tokio::test]
    async fn channel_failure_is_returned() {
        let channel = RecordingChannel::new();
        channel.fail_next("channel closed");

        let err = dispatcher(|| HandlerOutcome::Success)
            .dispatch(&delivery(), &channel)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ChannelError);
    }

    #[test]
    fn lists_routed_queues() {
        let dispatcher = dispatcher(|| HandlerOutcome::Success);
        assert_eq!(dispatcher.queues().collect::<Vec<_>>(), vec!["milestone.added"]);
    }
}
