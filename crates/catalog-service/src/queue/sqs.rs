//! SQS-backed ingestion queue.
//!
//! Redrive to a dead-letter queue is configured on the queue itself, so this side
//! only sends, long-polls and deletes.

use super::{AttributeValue, Delivery, IngestionQueue, MessageAttributes, QueueError, QueueSettings};
use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{MessageAttributeValue, MessageSystemAttributeName};
use aws_sdk_sqs::Client;
use tracing::{debug, instrument, warn};

/// SQS caps a single receive at 10 messages and 20 s of long polling.
const MAX_RECEIVE_BATCH: usize = 10;
const MAX_WAIT_SECS: u64 = 20;

pub struct SqsQueue {
    client: Client,
    queue_url: String,
    settings: QueueSettings,
}

impl SqsQueue {
    pub fn new(
        config: &aws_config::SdkConfig,
        endpoint_url: Option<&str>,
        queue_url: impl Into<String>,
        settings: QueueSettings,
    ) -> Self {
        let client = if let Some(endpoint) = endpoint_url {
            let sqs_config = aws_sdk_sqs::config::Builder::from(config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(sqs_config)
        } else {
            Client::new(config)
        };
        Self {
            client,
            queue_url: queue_url.into(),
            settings,
        }
    }
}

fn request_error<E: std::error::Error>(operation: &'static str, e: E) -> QueueError {
    QueueError::Request {
        operation,
        reason: DisplayErrorContext(e).to_string(),
    }
}

fn decode_attributes(
    attributes: Option<&std::collections::HashMap<String, MessageAttributeValue>>,
) -> MessageAttributes {
    attributes
        .into_iter()
        .flatten()
        .filter_map(|(name, value)| {
            AttributeValue::from_wire(value.data_type(), value.string_value())
                .map(|decoded| (name.clone(), decoded))
        })
        .collect()
}

#[async_trait]
impl IngestionQueue for SqsQueue {
    #[instrument(skip(self, body, attributes), fields(queue_url = %self.queue_url))]
    async fn send_with_attributes(
        &self,
        body: String,
        attributes: MessageAttributes,
    ) -> Result<String, QueueError> {
        let mut request = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body);
        for (name, value) in attributes {
            let value = MessageAttributeValue::builder()
                .data_type(value.data_type())
                .string_value(value.to_wire())
                .build()
                .map_err(|e| request_error("SendMessage", e))?;
            request = request.message_attributes(name, value);
        }

        let output = request
            .send()
            .await
            .map_err(|e| request_error("SendMessage", e))?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        debug!(%message_id, "Sent message to SQS");
        Ok(message_id)
    }

    #[instrument(skip(self), fields(queue_url = %self.queue_url))]
    async fn receive(&self) -> Result<Vec<Delivery>, QueueError> {
        let max = self.settings.batch_size.clamp(1, MAX_RECEIVE_BATCH) as i32;
        let wait = self.settings.batching_window.as_secs().min(MAX_WAIT_SECS) as i32;

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max)
            .wait_time_seconds(wait)
            .visibility_timeout(self.settings.visibility_timeout.as_secs() as i32)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| request_error("ReceiveMessage", e))?;

        let mut deliveries = Vec::new();
        for message in output.messages() {
            let (Some(message_id), Some(receipt)) = (message.message_id(), message.receipt_handle())
            else {
                warn!("Skipping SQS message without id or receipt handle");
                continue;
            };
            let receive_count = message
                .attributes()
                .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
                .and_then(|count| count.parse().ok())
                .unwrap_or(1);
            deliveries.push(Delivery {
                message_id: message_id.to_string(),
                receipt: receipt.to_string(),
                body: message.body().unwrap_or_default().to_string(),
                receive_count,
                attributes: decode_attributes(message.message_attributes()),
            });
        }

        debug!(count = deliveries.len(), "Received messages from SQS");
        Ok(deliveries)
    }

    #[instrument(skip(self, receipt), fields(queue_url = %self.queue_url))]
    async fn ack(&self, receipt: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt)
            .send()
            .await
            .map_err(|e| request_error("DeleteMessage", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attribute(data_type: &str, value: &str) -> MessageAttributeValue {
        MessageAttributeValue::builder()
            .data_type(data_type)
            .string_value(value)
            .build()
            .unwrap()
    }

    #[test]
    fn test_decode_attributes() {
        let raw = HashMap::from([
            ("sourceFile".to_string(), attribute("String", "uploaded/a.csv")),
            ("recordNumber".to_string(), attribute("Number", "7")),
            ("broken".to_string(), attribute("Number", "seven")),
        ]);

        let decoded = decode_attributes(Some(&raw));
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded["sourceFile"], AttributeValue::Text("uploaded/a.csv".into()));
        assert_eq!(decoded["recordNumber"], AttributeValue::Number(7));
        assert!(decode_attributes(None).is_empty());
    }
}
