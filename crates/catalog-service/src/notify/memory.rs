//! In-memory notification sink for local runs and tests.

use super::{NotificationSink, NotifyError};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// A notification as it was handed to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub message: String,
}

/// Records every notification; can be told to fail.
#[derive(Default)]
pub struct RecordingSink {
    sent: RwLock<Vec<Notification>>,
    fail_on_publish: RwLock<bool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_publish(&self, fail: bool) {
        *self.fail_on_publish.write().await = fail;
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }

    pub async fn take_sent(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.sent.write().await)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        if *self.fail_on_publish.read().await {
            return Err(NotifyError::Publish("sink configured to fail".to_string()));
        }
        info!(subject, "Notification");
        self.sent.write().await.push(Notification {
            subject: subject.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.publish("first", "{}").await.unwrap();
        sink.publish("second", "{}").await.unwrap();

        let subjects: Vec<_> = sink.take_sent().await.into_iter().map(|n| n.subject).collect();
        assert_eq!(subjects, vec!["first", "second"]);
        assert!(sink.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_sink_records_nothing() {
        let sink = RecordingSink::new();
        sink.set_fail_on_publish(true).await;

        assert!(sink.publish("subject", "{}").await.is_err());
        assert!(sink.sent().await.is_empty());
    }
}
