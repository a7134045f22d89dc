//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, events, errors)
//! - `timeline` - Timeline documents, milestone records, lifecycle events
//! - `phase` - Product/phase/project records and the phase-updated event
//! - `cascade` - Status-change event and the progress cascade decision

pub mod cascade;
pub mod foundation;
pub mod phase;
pub mod timeline;
