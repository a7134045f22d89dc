//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `TIMELINE_SYNC` prefix
//! and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use timeline_sync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Timelines live in {}", config.document_store.timeline_index);
//! ```

mod consumer;
mod database;
mod document_store;
mod error;
mod redis;
mod service;

pub use consumer::ConsumerConfig;
pub use database::DatabaseConfig;
pub use document_store::DocumentStoreConfig;
pub use error::{ConfigError, ValidationError};
pub use self::redis::RedisConfig;
pub use service::{Environment, ServiceConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Service name, environment and logging
    #[serde(default)]
    pub service: ServiceConfig,

    /// PostgreSQL holding phases, products and projects
    pub database: DatabaseConfig,

    /// Redis for processed-event tracking
    pub redis: RedisConfig,

    /// Document store holding timelines
    pub document_store: DocumentStoreConfig,

    /// Queue bindings
    #[serde(default)]
    pub consumer: ConsumerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `TIMELINE_SYNC` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `TIMELINE_SYNC__DATABASE__URL=...` -> `database.url`
    /// - `TIMELINE_SYNC__DOCUMENT_STORE__OPTIMISTIC_CONCURRENCY=false`
    ///   -> `document_store.optimistic_concurrency`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("TIMELINE_SYNC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.redis.validate()?;
        self.document_store.validate(self.is_production())?;
        self.consumer.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.service.is_production()
    }

    /// Key prefix for processed-event marks.
    pub fn processed_key_prefix(&self) -> &str {
        self.redis
            .key_prefix
            .as_deref()
            .unwrap_or(&self.service.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::LogFormat;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "TIMELINE_SYNC__DATABASE__URL",
        "TIMELINE_SYNC__REDIS__URL",
        "TIMELINE_SYNC__DOCUMENT_STORE__URL",
        "TIMELINE_SYNC__DOCUMENT_STORE__OPTIMISTIC_CONCURRENCY",
        "TIMELINE_SYNC__SERVICE__ENVIRONMENT",
        "TIMELINE_SYNC__SERVICE__LOG_FORMAT",
        "TIMELINE_SYNC__CONSUMER__ADDED_QUEUE",
    ];

    fn set_minimal_env() {
        env::set_var("TIMELINE_SYNC__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("TIMELINE_SYNC__REDIS__URL", "redis://localhost:6379");
        env::set_var("TIMELINE_SYNC__DOCUMENT_STORE__URL", "http://localhost:9200");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.document_store.url, "http://localhost:9200");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_section_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.service.environment, Environment::Development);
        assert_eq!(config.document_store.timeline_index, "timelines");
        assert!(config.document_store.optimistic_concurrency);
        assert_eq!(config.consumer.removed_queue, "milestone.removed");
        assert_eq!(config.processed_key_prefix(), "timeline-sync");
    }

    #[test]
    fn test_overrides() {
        let config = load_with(&[
            ("TIMELINE_SYNC__DOCUMENT_STORE__OPTIMISTIC_CONCURRENCY", "false"),
            ("TIMELINE_SYNC__SERVICE__LOG_FORMAT", "json"),
            ("TIMELINE_SYNC__CONSUMER__ADDED_QUEUE", "timeline.milestone.added"),
        ])
        .unwrap();
        assert!(!config.document_store.optimistic_concurrency);
        assert_eq!(config.service.log_format, LogFormat::Json);
        assert_eq!(config.consumer.added_queue, "timeline.milestone.added");
    }

    #[test]
    fn test_production_requires_https_document_store() {
        let config = load_with(&[("TIMELINE_SYNC__SERVICE__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::DocumentStoreMustBeHttps)
        );
    }

    #[test]
    fn test_missing_required_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("TIMELINE_SYNC__DATABASE__URL", "postgresql://test@localhost/test");
        let result = AppConfig::load();
        clear_env();
        assert!(result.is_err());
    }
}
