//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Queue Ports
//!
//! - `MessageChannel` - Ack/nack side of the lifecycle event queues
//! - `QueueHandler` - Handler bound to a queue, returns a `HandlerOutcome`
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for emitting domain events
//! - `EventSubscriber` / `EventHandler` - Subscription to domain events
//! - `ProcessedEventStore` - Idempotency tracking for event handlers
//! - `EventSchemaValidator` - Payload validation before decoding
//!
//! ## Storage Ports
//!
//! - `DocumentStore` - Timeline documents
//! - `PhaseRepository` - Product/phase/project rows

mod document_store;
mod event_publisher;
mod event_subscriber;
mod message_channel;
mod phase_repository;
mod processed_event_store;
mod schema_validator;

pub use document_store::{DocumentStore, DocumentVersion, StoredDocument};
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use message_channel::{Delivery, HandlerOutcome, MessageChannel, QueueHandler};
pub use phase_repository::PhaseRepository;
pub use processed_event_store::ProcessedEventStore;
pub use schema_validator::{EventSchema, EventSchemaValidator, SchemaValidationError};
