//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, event plumbing, and error types
//! that form the vocabulary of the timeline synchronization domain.

mod errors;
mod events;
mod ids;
mod progress;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{MilestoneId, PhaseId, ProductId, ProjectId, TimelineId, UserId};
pub use progress::Progress;
pub use timestamp::Timestamp;
