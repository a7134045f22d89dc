//! Event and message adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process domain event bus
//! - `IdempotentHandler` - Wrapper for at-most-once event application
//! - `InMemoryProcessedEventStore` - Processed-event marks kept in memory
//! - `QueueDispatcher` - Routes queue deliveries and settles them on the channel
//! - `RecordingChannel` - Message channel that records acks and nacks

mod idempotent_handler;
mod in_memory;
mod in_memory_processed_store;
mod queue_dispatcher;
mod recording_channel;

pub use idempotent_handler::IdempotentHandler;
pub use in_memory::InMemoryEventBus;
pub use in_memory_processed_store::InMemoryProcessedEventStore;
pub use queue_dispatcher::{QueueDispatcher, Settlement};
pub use recording_channel::{ChannelCall, RecordingChannel};
