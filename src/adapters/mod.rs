//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `document_store` - Elasticsearch and in-memory timeline storage
//! - `events` - Event bus, idempotency wrapper, queue dispatcher
//! - `memory` - In-memory relational repository
//! - `postgres` - PostgreSQL relational repository
//! - `redis` - Processed-event tracking
//! - `validation` - Event payload schema validation

pub mod document_store;
pub mod events;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod validation;

pub use document_store::{ElasticsearchDocumentStore, InMemoryDocumentStore};
pub use events::{
    ChannelCall, IdempotentHandler, InMemoryEventBus, InMemoryProcessedEventStore,
    QueueDispatcher, RecordingChannel, Settlement,
};
pub use memory::InMemoryPhaseRepository;
pub use postgres::PostgresPhaseRepository;
pub use self::redis::RedisProcessedEventStore;
pub use validation::StatusChangeValidator;
