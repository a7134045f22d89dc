//! Phase domain module.
//!
//! Relational records on the product → phase → project chain and the
//! event emitted when a phase's progress changes.

mod events;
mod records;

pub use events::PhaseUpdated;
pub use records::{PhaseRecord, ProductRecord, ProgressAdvance, ProjectRecord};
