//! Document store configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Document store (Elasticsearch) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentStoreConfig {
    /// Base URL of the cluster
    pub url: String,

    /// API key sent as `Authorization: ApiKey ...`
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Index holding timeline documents
    #[serde(default = "default_timeline_index")]
    pub timeline_index: String,

    /// Make timeline writes conditional on the version read
    #[serde(default = "default_optimistic_concurrency")]
    pub optimistic_concurrency: bool,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl DocumentStoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate document store configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DOCUMENT_STORE_URL"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidDocumentStoreUrl);
        }
        if production && !self.url.starts_with("https://") {
            return Err(ValidationError::DocumentStoreMustBeHttps);
        }
        if self.timeline_index.is_empty() {
            return Err(ValidationError::MissingRequired("DOCUMENT_STORE_TIMELINE_INDEX"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("document_store.request_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            timeline_index: default_timeline_index(),
            optimistic_concurrency: default_optimistic_concurrency(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_timeline_index() -> String {
    "timelines".to_string()
}

fn default_optimistic_concurrency() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    10
}
