//! SNS-backed notification sink.

use super::{NotificationSink, NotifyError};
use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;
use tracing::{debug, instrument};

/// Publishes to a single SNS topic.
pub struct SnsSink {
    client: Client,
    topic_arn: String,
}

impl SnsSink {
    pub fn new(
        config: &aws_config::SdkConfig,
        endpoint_url: Option<&str>,
        topic_arn: impl Into<String>,
    ) -> Self {
        let client = if let Some(endpoint) = endpoint_url {
            let sns_config = aws_sdk_sns::config::Builder::from(config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(sns_config)
        } else {
            Client::new(config)
        };
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for SnsSink {
    #[instrument(skip(self, message), fields(topic_arn = %self.topic_arn))]
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| NotifyError::Publish(DisplayErrorContext(e).to_string()))?;

        debug!(message_id = ?output.message_id, "Published notification to SNS");
        Ok(())
    }
}
