//! Cascade domain module.
//!
//! A milestone status change may ripple into the owning phase's progress.
//! This module decodes the status-change event and answers, without any I/O,
//! which product it concerns and whether the change completes a milestone.

mod status_change;

pub use status_change::{
    Completion, MilestoneSnapshot, StatusChangeEvent, TimelineReference, TimelineSummary,
};
