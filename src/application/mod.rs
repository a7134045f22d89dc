//! Application layer - Handlers that orchestrate domain operations over ports.

pub mod handlers;

pub use handlers::{
    AddMilestoneHandler, LoadedTimeline, PhaseProgressHandler, RemoveMilestoneHandler,
    TimelineStore, UpdateMilestoneHandler, MILESTONE_STATUS_CHANGED,
};
