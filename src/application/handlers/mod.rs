//! Application handlers.
//!
//! Queue handlers that keep timeline documents in sync, and the event
//! handler that cascades milestone completions into phase progress.

pub mod cascade;
pub mod timeline;

pub use cascade::{PhaseProgressHandler, MILESTONE_STATUS_CHANGED};
pub use timeline::{
    AddMilestoneHandler, LoadedTimeline, RemoveMilestoneHandler, TimelineStore,
    UpdateMilestoneHandler,
};
