//! Consumer configuration - queue bindings for lifecycle events

use serde::Deserialize;

use super::error::ValidationError;

/// Queue names the consumer binds handlers to
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    #[serde(default = "default_added_queue")]
    pub added_queue: String,

    #[serde(default = "default_updated_queue")]
    pub updated_queue: String,

    #[serde(default = "default_removed_queue")]
    pub removed_queue: String,

    /// Domain event type that triggers the phase progress cascade
    #[serde(default = "default_status_changed_event")]
    pub status_changed_event: String,
}

impl ConsumerConfig {
    /// Validate consumer configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let queues = [&self.added_queue, &self.updated_queue, &self.removed_queue];
        if queues.iter().any(|q| q.is_empty()) {
            return Err(ValidationError::MissingRequired("CONSUMER_QUEUE"));
        }
        if self.added_queue == self.updated_queue
            || self.added_queue == self.removed_queue
            || self.updated_queue == self.removed_queue
        {
            return Err(ValidationError::DuplicateQueueName);
        }
        if self.status_changed_event.is_empty() {
            return Err(ValidationError::MissingRequired("CONSUMER_STATUS_CHANGED_EVENT"));
        }
        Ok(())
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            added_queue: default_added_queue(),
            updated_queue: default_updated_queue(),
            removed_queue: default_removed_queue(),
            status_changed_event: default_status_changed_event(),
        }
    }
}

fn default_added_queue() -> String {
    "milestone.added".to_string()
}

fn default_updated_queue() -> String {
    "milestone.updated".to_string()
}

fn default_removed_queue() -> String {
    "milestone.removed".to_string()
}

fn default_status_changed_event() -> String {
    "milestone.status_changed".to_string()
}
