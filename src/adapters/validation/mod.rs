//! Validation Adapters - Schema validation implementations.
//!
//! Contains adapters for validating event payloads before they are decoded.

mod status_change_validator;

pub use status_change_validator::StatusChangeValidator;
