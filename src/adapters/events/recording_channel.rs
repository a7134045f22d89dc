//! In-memory message channel that records every ack and nack.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Delivery, MessageChannel};

/// A settle call as seen by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelCall {
    Ack {
        delivery_tag: u64,
    },
    Nack {
        delivery_tag: u64,
        multiple: bool,
        requeue: bool,
    },
}

/// `MessageChannel` that keeps calls for inspection.
#[derive(Default)]
pub struct RecordingChannel {
    calls: Mutex<Vec<ChannelCall>>,
    fail_next: Mutex<Option<String>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ChannelCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Makes the next ack or nack fail with `ChannelError`.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    fn record(&self, call: ChannelCall) -> Result<(), DomainError> {
        if let Some(message) = self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(DomainError::new(ErrorCode::ChannelError, message));
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        Ok(())
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    async fn ack(&self, delivery: &Delivery) -> Result<(), DomainError> {
        self.record(ChannelCall::Ack {
            delivery_tag: delivery.delivery_tag,
        })
    }

    async fn nack(
        &self,
        delivery: &Delivery,
        multiple: bool,
        requeue: bool,
    ) -> Result<(), DomainError> {
        self.record(ChannelCall::Nack {
            delivery_tag: delivery.delivery_tag,
            multiple,
            requeue,
        })
    }
}
