//! EventPublisher port - Interface for emitting domain events.
//!
//! Used by the cascade processor to announce phase changes without knowing
//! the transport behind it.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Emission is fire-and-forget from the domain's point of view: no
/// acknowledgement beyond the `Result` is expected, and delivery is
/// at-least-once.
///
/// # Example
///
/// ```ignore
/// let envelope = phase_updated.to_envelope()?.with_causation_id(cause);
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
