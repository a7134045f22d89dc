//! Strongly-typed identifier value objects.
//!
//! Relational rows are keyed by positive integers; the same value identifies
//! a milestone in the relational store and inside a timeline document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier without validation.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Creates an identifier, rejecting zero and negative values.
            pub fn try_new(value: i64) -> Result<Self, ValidationError> {
                if value <= 0 {
                    return Err(ValidationError::not_positive($field, value));
                }
                Ok(Self(value))
            }

            /// Returns the raw integer value.
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| ValidationError::invalid_format($field, e.to_string()))?;
                Self::try_new(value)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

integer_id!(
    /// Identifier of a timeline document.
    TimelineId,
    "timelineId"
);

integer_id!(
    /// Identifier of a milestone, shared by its relational row and its timeline entry.
    MilestoneId,
    "milestoneId"
);

integer_id!(
    /// Identifier of a product; product-backed timelines reference one.
    ProductId,
    "productId"
);

integer_id!(
    /// Identifier of a project phase.
    PhaseId,
    "phaseId"
);

integer_id!(
    /// Identifier of a project.
    ProjectId,
    "projectId"
);

integer_id!(
    /// Identifier of a user.
    UserId,
    "userId"
);
