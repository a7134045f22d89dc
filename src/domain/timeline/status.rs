//! MilestoneStatus enum for the lifecycle of a timeline milestone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a milestone as carried by relational events.
///
/// Statuses this service does not interpret are kept verbatim in `Other`
/// so they round-trip through the timeline document unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum MilestoneStatus {
    Planned,
    #[default]
    Active,
    Completed,
    Cancelled,
    Other(String),
}

impl MilestoneStatus {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            MilestoneStatus::Planned => "planned",
            MilestoneStatus::Active => "active",
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::Cancelled => "cancelled",
            MilestoneStatus::Other(raw) => raw,
        }
    }

    /// Returns true if the milestone is finished.
    pub fn is_completed(&self) -> bool {
        matches!(self, MilestoneStatus::Completed)
    }

    /// Returns true if moving from `self` to `target` completes the milestone.
    pub fn completes_with(&self, target: &MilestoneStatus) -> bool {
        !self.is_completed() && target.is_completed()
    }
}

impl From<String> for MilestoneStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "planned" => MilestoneStatus::Planned,
            "active" => MilestoneStatus::Active,
            "completed" => MilestoneStatus::Completed,
            "cancelled" => MilestoneStatus::Cancelled,
            _ => MilestoneStatus::Other(raw),
        }
    }
}

impl From<&str> for MilestoneStatus {
    fn from(raw: &str) -> Self {
        MilestoneStatus::from(raw.to_string())
    }
}

impl From<MilestoneStatus> for String {
    fn from(status: MilestoneStatus) -> Self {
        match status {
            MilestoneStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
