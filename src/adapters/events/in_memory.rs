//! In-memory event bus.
//!
//! Delivers synchronously to subscribed handlers and keeps every published
//! envelope for inspection. Used by tests and by single-process deployments
//! where `phase.updated` events have no remote consumer.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

/// In-process event bus.
///
/// Features:
/// - Synchronous delivery (deterministic for tests)
/// - Event capture for assertions
/// - Handler registration and invocation
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.subscribe("milestone.status_changed", cascade);
///
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("phase.updated.v1"));
/// ```
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    published: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all published events.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Checks if a specific event type was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());

        // Clone handlers to release lock before await points
        let type_handlers: Vec<Arc<dyn EventHandler>> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers
                .get(&event.event_type)
                .cloned()
                .unwrap_or_default()
        };

        let mut errors = Vec::new();
        let mut first_code = None;
        for handler in type_handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                first_code.get_or_insert(e.code);
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        match first_code {
            None => Ok(()),
            // A single failing handler keeps its code so callers can tell
            // validation failures from not-found ones.
            Some(code) if errors.len() == 1 => Err(DomainError::new(code, errors.remove(0))),
            Some(_) => Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", errors.join(", ")),
            )),
        }
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_envelope(event_type: &str, aggregate_id: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, aggregate_id, "Phase", json!({}))
    }

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    struct FailingHandler(ErrorCode);

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(self.0, "Handler failed"))
        }
        fn name(&self) -> &'static str {
            "FailingHandler"
        }
    }

    #[tokio::test]
    async fn publish_stores_event() {
        let bus = InMemoryEventBus::new();

        bus.publish(test_envelope("phase.updated.v1", "21")).await.unwrap();

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event("phase.updated.v1"));
    }

    #[tokio::test]
    async fn events_of_type_filters_by_type() {
        let bus = InMemoryEventBus::new();

        bus.publish(test_envelope("type.a", "1")).await.unwrap();
        bus.publish(test_envelope("type.b", "1")).await.unwrap();
        bus.publish(test_envelope("type.a", "2")).await.unwrap();

        let of_a = bus.events_of_type("type.a");
        assert_eq!(of_a.len(), 2);
        assert_eq!(of_a[0].aggregate_id, "1");
        assert_eq!(of_a[1].aggregate_id, "2");
    }

    #[tokio::test]
    async fn every_subscribed_handler_is_invoked() {
        let bus = InMemoryEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe("test.event", Arc::new(CountingHandler(counter.clone())));
        bus.subscribe("test.event", Arc::new(CountingHandler(counter.clone())));
        bus.publish(test_envelope("test.event", "1")).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn handlers_only_see_their_event_type() {
        let bus = InMemoryEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe("type.a", Arc::new(CountingHandler(counter.clone())));
        bus.publish(test_envelope("type.a", "1")).await.unwrap();
        bus.publish(test_envelope("type.b", "2")).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.event_count(), 2);
    }

    #[tokio::test]
    async fn single_handler_error_keeps_its_code() {
        let bus = InMemoryEventBus::new();
        bus.subscribe(
            "test.event",
            Arc::new(FailingHandler(ErrorCode::ValidationFailed)),
        );

        let err = bus.publish(test_envelope("test.event", "1")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.message.contains("FailingHandler"));
    }

    #[tokio::test]
    async fn several_handler_errors_are_combined() {
        let bus = InMemoryEventBus::new();
        bus.subscribe("test.event", Arc::new(FailingHandler(ErrorCode::PhaseNotFound)));
        bus.subscribe("test.event", Arc::new(FailingHandler(ErrorCode::DatabaseError)));

        let err = bus.publish(test_envelope("test.event", "1")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
