//! # Ingestion Queue
//!
//! At-least-once delivery of raw product records between the CSV importer and the
//! batch processor. A received message stays leased (hidden) until it is acked or its
//! visibility timeout passes; a message received too often is dead-lettered.

pub mod memory;
pub mod sqs;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

pub use memory::{MemoryQueue, QueueActor, QueueStats};
pub use sqs::SqsQueue;

/// One received message.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub message_id: String,
    /// Handle for acknowledging this particular delivery.
    pub receipt: String,
    pub body: String,
    /// How many times the message has been handed out, this delivery included.
    pub receive_count: u32,
    pub attributes: MessageAttributes,
}

/// A typed message attribute, carried beside the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Number(i64),
}

impl AttributeValue {
    /// SQS data type name.
    pub fn data_type(&self) -> &'static str {
        match self {
            AttributeValue::Text(_) => "String",
            AttributeValue::Number(_) => "Number",
        }
    }

    pub fn to_wire(&self) -> String {
        match self {
            AttributeValue::Text(text) => text.clone(),
            AttributeValue::Number(n) => n.to_string(),
        }
    }

    /// Decode an SQS attribute. Binary attributes and unparseable numbers yield `None`.
    pub fn from_wire(data_type: &str, value: Option<&str>) -> Option<Self> {
        let value = value?;
        if data_type.starts_with("Number") {
            value.parse().ok().map(AttributeValue::Number)
        } else if data_type.starts_with("String") {
            Some(AttributeValue::Text(value.to_string()))
        } else {
            None
        }
    }
}

pub type MessageAttributes = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct QueueSettings {
    pub batch_size: usize,
    pub batching_window: Duration,
    pub visibility_timeout: Duration,
    pub max_receive_count: u32,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batching_window: Duration::from_secs(1),
            visibility_timeout: Duration::from_secs(30),
            max_receive_count: 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue actor closed")]
    Closed,
    #[error("Queue actor dropped response channel")]
    Dropped,
    #[error("Unknown or expired receipt: {0}")]
    UnknownReceipt(String),
    #[error("{operation} failed: {reason}")]
    Request {
        operation: &'static str,
        reason: String,
    },
}

#[async_trait]
pub trait IngestionQueue: Send + Sync {
    /// Enqueue one record body; returns the message id.
    async fn send(&self, body: String) -> Result<String, QueueError> {
        self.send_with_attributes(body, MessageAttributes::new()).await
    }

    async fn send_with_attributes(
        &self,
        body: String,
        attributes: MessageAttributes,
    ) -> Result<String, QueueError>;

    /// Wait up to the batching window for up to one batch of messages.
    async fn receive(&self) -> Result<Vec<Delivery>, QueueError>;

    /// Delete a delivered message so it is never redelivered.
    async fn ack(&self, receipt: &str) -> Result<(), QueueError>;
}
