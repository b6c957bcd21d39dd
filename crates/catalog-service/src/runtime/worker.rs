//! # Queue Worker
//!
//! Plays the part of the Lambda event-source mapping for the local queue: receive a
//! batch, run the processor under the batch deadline, then acknowledge every message
//! except the ones reported as failed. A batch-level error acknowledges nothing, so
//! the whole batch comes back after the visibility timeout.

use crate::catalog::{BatchOutcome, BatchProcessor, CatalogError, QueuedRecord};
use crate::queue::{Delivery, IngestionQueue};
use crate::runtime::deadline::with_deadline;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// What happened to one received batch.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerTick {
    pub received: usize,
    pub acked: usize,
    /// `None` when the batch as a whole failed.
    pub outcome: Option<BatchOutcome>,
}

#[derive(Clone)]
pub struct QueueWorker {
    queue: Arc<dyn IngestionQueue>,
    processor: Arc<BatchProcessor>,
    batch_timeout: Duration,
}

impl QueueWorker {
    pub fn new(
        queue: Arc<dyn IngestionQueue>,
        processor: Arc<BatchProcessor>,
        batch_timeout: Duration,
    ) -> Self {
        Self {
            queue,
            processor,
            batch_timeout,
        }
    }

    /// Receive and handle at most one batch. Returns `None` when nothing arrived within
    /// the batching window.
    pub async fn run_once(&self) -> Result<Option<WorkerTick>, CatalogError> {
        let deliveries = self.queue.receive().await?;
        if deliveries.is_empty() {
            return Ok(None);
        }
        let records: Vec<QueuedRecord> = deliveries.iter().map(QueuedRecord::from).collect();

        let result = with_deadline(self.batch_timeout, self.processor.process(&records)).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, messages = deliveries.len(), "Batch failed; leaving every message for redelivery");
                return Ok(Some(WorkerTick {
                    received: deliveries.len(),
                    acked: 0,
                    outcome: None,
                }));
            }
        };

        let acked = self.ack_completed(&deliveries, &outcome).await;
        Ok(Some(WorkerTick {
            received: deliveries.len(),
            acked,
            outcome: Some(outcome),
        }))
    }

    async fn ack_completed(&self, deliveries: &[Delivery], outcome: &BatchOutcome) -> usize {
        let mut acked = 0;
        for delivery in deliveries {
            if outcome.failed.contains(&delivery.message_id) {
                debug!(message_id = %delivery.message_id, "Leaving failed message for redelivery");
                continue;
            }
            match self.queue.ack(&delivery.receipt).await {
                Ok(()) => acked += 1,
                Err(e) => warn!(message_id = %delivery.message_id, error = %e, "Ack failed"),
            }
        }
        acked
    }

    /// Poll until `shutdown` fires or the queue goes away.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        info!("Queue worker started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                tick = self.run_once() => {
                    if let Err(e) = tick {
                        error!(error = %e, "Queue worker stopping");
                        break;
                    }
                }
            }
        }
        info!("Queue worker stopped");
    }
}
