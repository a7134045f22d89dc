//! Timeline Sync - Milestone lifecycle consumers.
//!
//! Keeps denormalized timeline documents in step with relational milestone
//! changes, and advances phase progress when a milestone completes.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
