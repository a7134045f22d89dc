//! Progress value object (0-100 float scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Completion percentage of a phase, between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Progress(f64);

impl Progress {
    /// Zero percent.
    pub const ZERO: Self = Self(0.0);

    /// One hundred percent.
    pub const COMPLETE: Self = Self(100.0);

    /// Creates a new Progress, clamping to the valid range.
    ///
    /// NaN collapses to zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Creates a Progress, returning error if out of range.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::out_of_range("progress", 0.0, 100.0, value));
        }
        Ok(Self(value))
    }

    /// Returns the raw percentage.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Adds the share `part / whole` of the total, expressed in percent.
    ///
    /// The result is clamped to 100. Returns `None` when `whole` is not positive.
    pub fn advance_by_share(&self, part: f64, whole: f64) -> Option<Self> {
        if !(whole > 0.0) {
            return None;
        }
        Some(Self::new(self.0 + (part / whole) * 100.0))
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<f64> for Progress {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Progress> for f64 {
    fn from(progress: Progress) -> Self {
        progress.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
