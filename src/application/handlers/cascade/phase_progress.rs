//! PhaseProgressHandler - Event handler for milestone status changes.
//!
//! When a milestone on a product-backed timeline is completed, the owning
//! phase advances by the milestone's share of the timeline duration:
//!
//! ```text
//! new_progress = phase.progress + (milestone.duration / timeline.duration) * 100
//! ```
//!
//! The new value is written and a `PhaseUpdated` event is published.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::cascade::{Completion, StatusChangeEvent};
use crate::domain::foundation::{
    DomainError, ErrorCode, EventEnvelope, EventId, ProductId, SerializableDomainEvent, Timestamp,
};
use crate::domain::phase::{PhaseRecord, PhaseUpdated};
use crate::ports::{EventHandler, EventPublisher, EventSchema, EventSchemaValidator, PhaseRepository};

/// Event type this handler subscribes to.
pub const MILESTONE_STATUS_CHANGED: &str = "milestone.status_changed";

/// Recalculates phase progress after a milestone completes.
///
/// Order of checks: schema, product-backed timeline, product → phase →
/// project chain, then the status transition. A broken chain is a not-found
/// error for the event whatever the transition; it is logged and returned,
/// never retried here.
///
/// The progress write is keyed by the triggering event id, so a retry of an
/// event whose publish failed re-emits the recorded change instead of
/// advancing the phase again.
pub struct PhaseProgressHandler {
    validator: Arc<dyn EventSchemaValidator>,
    phases: Arc<dyn PhaseRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl PhaseProgressHandler {
    pub fn new(
        validator: Arc<dyn EventSchemaValidator>,
        phases: Arc<dyn PhaseRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            validator,
            phases,
            event_publisher,
        }
    }

    /// Applies a decoded status change triggered by event `trigger`.
    ///
    /// Returns the published event, or `None` when the change does not
    /// affect any phase.
    pub async fn process(
        &self,
        event: &StatusChangeEvent,
        trigger: &EventId,
    ) -> Result<Option<PhaseUpdated>, DomainError> {
        let Some(product_id) = event.product_reference()? else {
            debug!(
                project_id = %event.project_id,
                reference = %event.timeline.reference,
                "Timeline is not product-backed"
            );
            return Ok(None);
        };

        let original_phase = self.resolve_chain(product_id).await.map_err(|e| {
            warn!(
                product_id = %product_id,
                code = %e.code,
                error = %e,
                "Could not resolve product to phase to project"
            );
            e
        })?;

        let (milestone_duration, timeline_duration) = match event.completion() {
            Completion::Share {
                milestone_duration,
                timeline_duration,
            } => (milestone_duration, timeline_duration),
            completion => {
                debug!(
                    phase_id = %original_phase.id,
                    completion = ?completion,
                    "Status change does not affect phase progress"
                );
                return Ok(None);
            }
        };

        let Some(progress) = original_phase
            .progress
            .advance_by_share(milestone_duration, timeline_duration)
        else {
            return Ok(None);
        };

        let advance = self
            .phases
            .apply_progress(trigger, &original_phase, progress)
            .await?;
        if advance.replayed {
            info!(
                phase_id = %original_phase.id,
                event_id = %trigger,
                "Progress already applied for this event, publishing recorded change"
            );
        }

        let phase_updated = PhaseUpdated {
            event_id: EventId::new(),
            project_id: advance.original.project_id,
            phase_id: advance.original.id,
            original_phase: advance.original.clone(),
            updated_phase: advance.updated.clone(),
            initiator_user_id: event.initiator_user_id,
            updated_at: Timestamp::now(),
        };

        let envelope = phase_updated
            .to_envelope()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to encode PhaseUpdated: {}", e),
                )
            })?
            .with_causation_id(trigger.as_str())
            .with_user_id(event.initiator_user_id.to_string());
        self.event_publisher.publish(envelope).await?;

        info!(
            phase_id = %advance.original.id,
            project_id = %advance.original.project_id,
            from = %advance.original.progress,
            to = %advance.updated.progress,
            "Phase progress advanced"
        );

        Ok(Some(phase_updated))
    }

    /// Walks product → phase → project and returns the phase as stored.
    async fn resolve_chain(&self, product_id: ProductId) -> Result<PhaseRecord, DomainError> {
        let product = self.phases.find_product(product_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::ProductNotFound, "Product not found")
                .with_detail("product_id", product_id.to_string())
        })?;

        let phase = self
            .phases
            .find_phase(product.phase_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::PhaseNotFound, "Phase not found")
                    .with_detail("phase_id", product.phase_id.to_string())
            })?;

        self.phases
            .find_project(phase.project_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ProjectNotFound, "Project not found")
                    .with_detail("project_id", phase.project_id.to_string())
            })?;

        Ok(phase)
    }
}

#[async_trait]
impl EventHandler for PhaseProgressHandler {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), DomainError> {
        self.validator
            .validate(EventSchema::MilestoneStatusChanged, &envelope.payload)?;

        let event: StatusChangeEvent = envelope
            .payload_as()
            .map_err(|e| DomainError::malformed(format!("Invalid status-change payload: {}", e)))?;

        self.process(&event, &envelope.event_id).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "PhaseProgressHandler"
    }
}
