//! Cascade handlers - react to milestone status changes.

mod phase_progress;

pub use phase_progress::{PhaseProgressHandler, MILESTONE_STATUS_CHANGED};
