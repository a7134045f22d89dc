//! IdempotentHandler - Wrapper for at-most-once event application.
//!
//! Wraps any `EventHandler` and consults a `ProcessedEventStore` so each
//! event id is applied at most once per handler.
//!
//! ```ignore
//! let cascade = IdempotentHandler::new(
//!     PhaseProgressHandler::new(validator, phases, publisher),
//!     processed_events.clone(),
//! );
//! event_bus.subscribe(MILESTONE_STATUS_CHANGED, Arc::new(cascade));
//! ```
//!
//! If the inner handler fails, the event is not marked, so the next
//! delivery retries it. Store errors propagate to the caller.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::{EventHandler, ProcessedEventStore};

/// Decorates an `EventHandler` with duplicate suppression.
///
/// Uses the handler's `name()` as the idempotency key.
pub struct IdempotentHandler<H: EventHandler> {
    inner: H,
    processed_events: Arc<dyn ProcessedEventStore>,
}

impl<H: EventHandler> IdempotentHandler<H> {
    pub fn new(inner: H, processed_events: Arc<dyn ProcessedEventStore>) -> Self {
        Self {
            inner,
            processed_events,
        }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<H: EventHandler + 'static> EventHandler for IdempotentHandler<H> {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), DomainError> {
        let handler_name = self.inner.name();

        if self
            .processed_events
            .contains(&envelope.event_id, handler_name)
            .await?
        {
            debug!(
                event_id = %envelope.event_id,
                handler = handler_name,
                "Skipping duplicate event"
            );
            return Ok(());
        }

        let event_id = envelope.event_id.clone();
        self.inner.handle(envelope).await?;

        self.processed_events
            .mark_processed(&event_id, handler_name)
            .await?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
