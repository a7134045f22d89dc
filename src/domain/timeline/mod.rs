//! Timeline domain module.
//!
//! A timeline document is the denormalized, document-store copy of a
//! project's milestones. This module holds the record types, the lifecycle
//! events that describe relational changes, and the pure transformations
//! that fold those events into the document.
//!
//! # Events consumed
//!
//! - `MilestoneAdded` - insert with shift-right renumbering
//! - `MilestoneUpdated` - field-wise merge, optional sibling cascade
//! - `MilestoneRemoved` - filter, no renumbering

mod document;
mod errors;
mod events;
mod milestone;
mod status;

pub use document::{Insertion, TimelineDocument, UpdateSummary};
pub use errors::TimelineError;
pub use events::{
    decode_payload, CascadedUpdates, MilestoneAdded, MilestoneRemoved, MilestoneUpdated,
    OriginalMilestone,
};
pub use milestone::{MilestonePatch, MilestoneRecord};
pub use status::MilestoneStatus;
