//! Phase domain events.
//!
//! - `PhaseUpdated` - a phase's progress was recalculated after a milestone completed

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, PhaseId, ProjectId, Timestamp, UserId};

use super::PhaseRecord;

/// Published after a milestone completion advanced a phase's progress.
///
/// Carries both snapshots so consumers can diff without a lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseUpdated {
    /// Unique identifier for this event.
    pub event_id: EventId,

    pub project_id: ProjectId,

    pub phase_id: PhaseId,

    /// Phase as read before the write.
    pub original_phase: PhaseRecord,

    /// Phase as returned by the write.
    pub updated_phase: PhaseRecord,

    /// User whose action completed the milestone.
    pub initiator_user_id: UserId,

    pub updated_at: Timestamp,
}

domain_event!(
    PhaseUpdated,
    event_type = "phase.updated.v1",
    aggregate_id = phase_id,
    aggregate_type = "Phase",
    occurred_at = updated_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Progress, SerializableDomainEvent};

    #[test]
    fn envelope_is_keyed_by_phase() {
        let original = PhaseRecord {
            id: PhaseId::new(2),
            project_id: ProjectId::new(1),
            progress: Progress::new(20.0),
        };
        let event = PhaseUpdated {
            event_id: EventId::new(),
            project_id: ProjectId::new(1),
            phase_id: PhaseId::new(2),
            updated_phase: original.with_progress(Progress::new(45.0)),
            original_phase: original,
            initiator_user_id: UserId::new(8),
            updated_at: Timestamp::now(),
        };

        let envelope = event.to_envelope().unwrap();

        assert_eq!(envelope.event_type, "phase.updated.v1");
        assert_eq!(envelope.aggregate_type, "Phase");
        assert_eq!(envelope.aggregate_id, "2");
        assert_eq!(envelope.payload["updatedPhase"]["progress"], 45.0);
        assert_eq!(envelope.payload["originalPhase"]["progress"], 20.0);
        assert_eq!(envelope.payload["initiatorUserId"], 8);
    }
}
