//! Composition root - connects adapters and binds handlers.
//!
//! ```ignore
//! let config = AppConfig::load()?;
//! config.validate()?;
//! telemetry::init_logging(config.service.log_format, &config.service.log_level);
//!
//! let ports = Ports::connect(&config).await?;
//! let bus = Arc::new(InMemoryEventBus::new());
//! let dispatcher = wire(&config, ports, bus.clone(), bus.as_ref());
//!
//! // for each delivery from the broker:
//! dispatcher.dispatch(&delivery, &channel).await?;
//! ```

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::adapters::{
    ElasticsearchDocumentStore, IdempotentHandler, PostgresPhaseRepository, QueueDispatcher,
    RedisProcessedEventStore, StatusChangeValidator,
};
use crate::application::{
    AddMilestoneHandler, PhaseProgressHandler, RemoveMilestoneHandler, TimelineStore,
    UpdateMilestoneHandler,
};
use crate::config::AppConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{
    DocumentStore, EventPublisher, EventSchemaValidator, EventSubscriber, PhaseRepository,
    ProcessedEventStore,
};

/// Port implementations the handlers are built from.
#[derive(Clone)]
pub struct Ports {
    pub documents: Arc<dyn DocumentStore>,
    pub phases: Arc<dyn PhaseRepository>,
    pub processed_events: Arc<dyn ProcessedEventStore>,
    pub validator: Arc<dyn EventSchemaValidator>,
}

impl Ports {
    /// Connects to PostgreSQL, Redis and the document store.
    pub async fn connect(config: &AppConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.database.min_connections)
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.database.acquire_timeout())
            .connect(&config.database.url)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to connect to database: {}", e),
                )
            })?;

        let redis_client = redis::Client::open(config.redis.url.as_str())
            .map_err(|e| DomainError::new(ErrorCode::CacheError, e.to_string()))?;
        let redis_conn = redis_client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::CacheError,
                    format!("Failed to connect to Redis: {}", e),
                )
            })?;

        let documents = ElasticsearchDocumentStore::new(&config.document_store)?;

        info!(
            timeline_index = %config.document_store.timeline_index,
            optimistic_concurrency = config.document_store.optimistic_concurrency,
            "Connected to backing stores"
        );

        Ok(Self {
            documents: Arc::new(documents),
            phases: Arc::new(PostgresPhaseRepository::new(pool)),
            processed_events: Arc::new(RedisProcessedEventStore::new(
                redis_conn,
                config.processed_key_prefix(),
                config.redis.processed_ttl_secs,
            )),
            validator: Arc::new(StatusChangeValidator::new()),
        })
    }
}

/// Binds the three lifecycle queues and subscribes the progress cascade.
///
/// The cascade publishes `phase.updated` through `publisher` and is wrapped
/// so a redelivered status change is applied once.
pub fn wire(
    config: &AppConfig,
    ports: Ports,
    publisher: Arc<dyn EventPublisher>,
    subscriber: &dyn EventSubscriber,
) -> QueueDispatcher {
    let timelines = TimelineStore::new(
        ports.documents.clone(),
        config.document_store.timeline_index.clone(),
    )
    .with_optimistic_concurrency(config.document_store.optimistic_concurrency);

    let cascade = IdempotentHandler::new(
        PhaseProgressHandler::new(ports.validator.clone(), ports.phases.clone(), publisher),
        ports.processed_events.clone(),
    );
    subscriber.subscribe(&config.consumer.status_changed_event, Arc::new(cascade));

    let consumer = &config.consumer;
    QueueDispatcher::new()
        .route(
            consumer.added_queue.clone(),
            Arc::new(AddMilestoneHandler::new(timelines.clone())),
        )
        .route(
            consumer.updated_queue.clone(),
            Arc::new(UpdateMilestoneHandler::new(timelines.clone())),
        )
        .route(
            consumer.removed_queue.clone(),
            Arc::new(RemoveMilestoneHandler::new(timelines)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryDocumentStore, InMemoryEventBus, InMemoryPhaseRepository,
        InMemoryProcessedEventStore,
    };
    use crate::config::{DatabaseConfig, DocumentStoreConfig, RedisConfig};

    fn config() -> AppConfig {
        AppConfig {
            service: Default::default(),
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            document_store: DocumentStoreConfig::default(),
            consumer: Default::default(),
        }
    }

    #[test]
    fn binds_all_lifecycle_queues() {
        let bus = Arc::new(InMemoryEventBus::new());
        let ports = Ports {
            documents: Arc::new(InMemoryDocumentStore::new()),
            phases: Arc::new(InMemoryPhaseRepository::new()),
            processed_events: Arc::new(InMemoryProcessedEventStore::new()),
            validator: Arc::new(StatusChangeValidator::new()),
        };

        let dispatcher = wire(&config(), ports, bus.clone(), bus.as_ref());

        let mut queues: Vec<_> = dispatcher.queues().collect();
        queues.sort();
        assert_eq!(
            queues,
            vec!["milestone.added", "milestone.removed", "milestone.updated"]
        );
    }
}
