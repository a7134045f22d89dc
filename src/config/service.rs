//! Service configuration

use serde::Deserialize;

use crate::telemetry::LogFormat;

/// Service identity and logging
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name, used as the processed-event key prefix default
    #[serde(default = "default_name")]
    pub name: String,

    /// Environment name
    #[serde(default)]
    pub environment: Environment,

    /// Log filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Application environment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServiceConfig {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            environment: Environment::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_name() -> String {
    "timeline-sync".to_string()
}

fn default_log_level() -> String {
    "info,timeline_sync=debug".to_string()
}
