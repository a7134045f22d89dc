//! MessageChannel port - Acknowledgement side of the queue consumer.
//!
//! Lifecycle events arrive on named queues. Each delivery must be either
//! acknowledged or negatively acknowledged on the channel it came from.
//! Queue handlers never touch the channel; they return a `HandlerOutcome`
//! and the dispatcher owns the acknowledge decision.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::DomainError;

/// One message as handed over by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Queue the message was consumed from.
    pub queue: String,

    /// Channel-scoped tag used to ack or nack this delivery.
    pub delivery_tag: u64,

    /// True when the bus has delivered this message before.
    pub redelivered: bool,

    /// JSON-encoded payload.
    pub payload: Vec<u8>,
}

impl Delivery {
    pub fn new(queue: impl Into<String>, delivery_tag: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            queue: queue.into(),
            delivery_tag,
            redelivered: false,
            payload: payload.into(),
        }
    }

    /// Marks this delivery as a redelivery.
    pub fn redelivered(mut self) -> Self {
        self.redelivered = true;
        self
    }
}

/// Port for acknowledging deliveries.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Confirm the delivery was consumed.
    async fn ack(&self, delivery: &Delivery) -> Result<(), DomainError>;

    /// Reject the delivery.
    ///
    /// `multiple` rejects every unacknowledged delivery up to this one;
    /// `requeue` asks the bus to deliver the message again.
    async fn nack(&self, delivery: &Delivery, multiple: bool, requeue: bool)
        -> Result<(), DomainError>;
}

/// What a queue handler made of a delivery.
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    /// The event was applied (or was already applied).
    Success,
    /// The event failed for a reason that may clear up on redelivery.
    RetryableFailure(DomainError),
    /// The event can never succeed; redelivery would only loop.
    TerminalFailure(DomainError),
}

impl HandlerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, HandlerOutcome::Success)
    }

    /// Returns the failure carried by this outcome, if any.
    pub fn error(&self) -> Option<&DomainError> {
        match self {
            HandlerOutcome::Success => None,
            HandlerOutcome::RetryableFailure(e) | HandlerOutcome::TerminalFailure(e) => Some(e),
        }
    }
}

impl From<Result<(), DomainError>> for HandlerOutcome {
    fn from(result: Result<(), DomainError>) -> Self {
        match result {
            Ok(()) => HandlerOutcome::Success,
            Err(e) if e.code.is_terminal() => HandlerOutcome::TerminalFailure(e),
            Err(e) => HandlerOutcome::RetryableFailure(e),
        }
    }
}

impl fmt::Display for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerOutcome::Success => write!(f, "success"),
            HandlerOutcome::RetryableFailure(e) => write!(f, "retryable failure: {}", e),
            HandlerOutcome::TerminalFailure(e) => write!(f, "terminal failure: {}", e),
        }
    }
}

/// Handler bound to a queue.
///
/// Must not panic and must not propagate errors: every failure is folded
/// into the returned outcome.
#[async_trait]
pub trait QueueHandler: Send + Sync {
    async fn handle(&self, delivery: &Delivery) -> HandlerOutcome;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[allow(dead_code)]
    fn assert_channel_object_safe(_: &dyn MessageChannel) {}

    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn QueueHandler) {}

    #[test]
    fn ok_result_is_success() {
        assert!(HandlerOutcome::from(Ok(())).is_success());
    }

    #[test]
    fn malformed_payload_is_terminal() {
        let outcome = HandlerOutcome::from(Err(DomainError::malformed("bad json")));
        assert!(matches!(outcome, HandlerOutcome::TerminalFailure(_)));
    }

    #[test]
    fn store_failure_and_missing_timeline_are_retryable() {
        for code in [ErrorCode::DocumentStoreError, ErrorCode::TimelineNotFound, ErrorCode::VersionConflict] {
            let outcome = HandlerOutcome::from(Err(DomainError::new(code, "boom")));
            assert!(matches!(outcome, HandlerOutcome::RetryableFailure(_)), "{:?}", code);
        }
    }

    #[test]
    fn delivery_builder_marks_redelivery() {
        let delivery = Delivery::new("milestone.added", 4, b"{}".to_vec());
        assert!(!delivery.redelivered);
        assert!(delivery.redelivered().redelivered);
    }
}
