//! # Notification Sink
//!
//! Fan-out of batch summaries: one subject line plus a JSON body per batch.

pub mod memory;
pub mod sns;

use async_trait::async_trait;

pub use memory::RecordingSink;
pub use sns::SnsSink;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to publish notification: {0}")]
    Publish(String),
    #[error("Failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError>;
}
