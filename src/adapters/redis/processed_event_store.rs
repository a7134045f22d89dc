//! Redis-backed processed-event store for multi-worker deployments.
//!
//! One key per `(handler, event)` pair with a TTL. The TTL bounds how long
//! a redelivery is recognized; the bus never redelivers older messages.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, EventId};
use crate::ports::ProcessedEventStore;

/// Redis `ProcessedEventStore`.
#[derive(Clone)]
pub struct RedisProcessedEventStore {
    conn: MultiplexedConnection,
    key_prefix: String,
    ttl_secs: u64,
}

impl RedisProcessedEventStore {
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            ttl_secs,
        }
    }

    fn key(&self, event_id: &EventId, handler_name: &str) -> String {
        processed_key(&self.key_prefix, event_id, handler_name)
    }
}

fn processed_key(prefix: &str, event_id: &EventId, handler_name: &str) -> String {
    format!("{}:processed:{}:{}", prefix, handler_name, event_id)
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, e.to_string())
}

#[async_trait]
impl ProcessedEventStore for RedisProcessedEventStore {
    async fn contains(&self, event_id: &EventId, handler_name: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn.clone();
        conn.exists(self.key(event_id, handler_name))
            .await
            .map_err(cache_error)
    }

    async fn mark_processed(
        &self,
        event_id: &EventId,
        handler_name: &str,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(self.key(event_id, handler_name))
            .arg(1_u8)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_error)
    }
}
