//! # Batch Processor
//!
//! Turns queued records into Product and Stock rows and announces what was created.
//! Records are handled independently: a bad record is skipped, a record whose write
//! failed is reported back for redelivery, and the rest of the batch carries on.

use super::CatalogError;
use crate::model::{BatchMessage, BatchSummary, NumericCoercion, Product};
use crate::notify::{NotificationSink, NotifyError};
use crate::queue::Delivery;
use crate::store::{CatalogStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// What a failed batch notification does to the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPolicy {
    /// Log the failure; the batch still succeeds.
    #[default]
    BestEffort,
    /// Fail the whole batch so the queue redelivers it.
    Strict,
}

/// One message as handed to the processor.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedRecord {
    pub message_id: String,
    pub body: String,
}

impl QueuedRecord {
    pub fn new(message_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
        }
    }
}

impl From<&Delivery> for QueuedRecord {
    fn from(delivery: &Delivery) -> Self {
        Self::new(delivery.message_id.clone(), delivery.body.clone())
    }
}

/// Per-record results of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub created: Vec<Product>,
    /// Message ids of records dropped as invalid. They must not be retried.
    pub skipped: Vec<String>,
    /// Message ids whose writes failed. They must be redelivered.
    pub failed: Vec<String>,
}

enum RecordResult {
    Created(Product),
    Skipped,
}

pub struct BatchProcessor {
    store: Arc<dyn CatalogStore>,
    notifier: Arc<dyn NotificationSink>,
    coercion: NumericCoercion,
    policy: NotificationPolicy,
}

impl BatchProcessor {
    pub fn new(store: Arc<dyn CatalogStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            notifier,
            coercion: NumericCoercion::default(),
            policy: NotificationPolicy::default(),
        }
    }

    pub fn with_coercion(mut self, coercion: NumericCoercion) -> Self {
        self.coercion = coercion;
        self
    }

    pub fn with_policy(mut self, policy: NotificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Process one batch.
    ///
    /// Returns `Err` only for batch-level faults (a strict notification failure); the
    /// caller must then treat every record as undelivered.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn process(&self, records: &[QueuedRecord]) -> Result<BatchOutcome, CatalogError> {
        let mut outcome = BatchOutcome::default();

        for record in records {
            match self.process_record(record).await {
                Ok(RecordResult::Created(product)) => outcome.created.push(product),
                Ok(RecordResult::Skipped) => outcome.skipped.push(record.message_id.clone()),
                Err(e) => {
                    error!(message_id = %record.message_id, error = %e, "Record write failed");
                    outcome.failed.push(record.message_id.clone());
                }
            }
        }

        if !outcome.created.is_empty() {
            self.announce(&outcome.created).await?;
        }

        info!(
            created = outcome.created.len(),
            skipped = outcome.skipped.len(),
            failed = outcome.failed.len(),
            "Batch processed"
        );
        Ok(outcome)
    }

    async fn process_record(&self, record: &QueuedRecord) -> Result<RecordResult, StoreError> {
        let rows = BatchMessage::parse(&record.body)
            .and_then(|message| message.into_rows(self.coercion, || Uuid::new_v4().to_string()));
        let (product, stock) = match rows {
            Ok(rows) => rows,
            Err(rejection) => {
                warn!(
                    message_id = %record.message_id,
                    reason = %rejection,
                    body = %record.body,
                    "Skipping invalid record"
                );
                return Ok(RecordResult::Skipped);
            }
        };

        debug!(message_id = %record.message_id, ?product, ?stock, "Writing record");
        self.store.put_product(product.clone()).await?;
        self.store.put_stock(stock).await?;

        info!(id = %product.id, title = %product.title, "Product created");
        Ok(RecordResult::Created(product))
    }

    async fn announce(&self, created: &[Product]) -> Result<(), CatalogError> {
        let summary = BatchSummary::new(created);
        let result = match serde_json::to_string_pretty(&summary) {
            Ok(body) => self.notifier.publish(&summary.subject(), &body).await,
            Err(e) => Err(NotifyError::from(e)),
        };

        match (result, self.policy) {
            (Ok(()), _) => {
                info!(products = summary.products_created, "Batch notification sent");
                Ok(())
            }
            (Err(e), NotificationPolicy::BestEffort) => {
                warn!(error = %e, "Batch notification failed; continuing");
                Ok(())
            }
            (Err(e), NotificationPolicy::Strict) => Err(e.into()),
        }
    }
}
