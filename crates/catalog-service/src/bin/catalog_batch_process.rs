//! Lambda entrypoint for the ingestion queue's event-source mapping.
//!
//! Returns a partial batch response: records whose writes failed are listed as item
//! failures and redelivered, everything else is deleted. The mapping must have
//! `ReportBatchItemFailures` enabled. Batch-level faults fail the invocation, which
//! redelivers the whole batch.

use aws_lambda_events::event::sqs::{BatchItemFailure, SqsBatchResponse, SqsEvent};
use catalog_framework::tracing::setup_lambda_tracing;
use catalog_service::catalog::{BatchProcessor, QueuedRecord};
use catalog_service::runtime::deadline::{effective_timeout, with_deadline};
use catalog_service::runtime::{aws, CatalogConfig};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

async fn handle(
    processor: &BatchProcessor,
    timeout: Duration,
    event: LambdaEvent<SqsEvent>,
) -> Result<SqsBatchResponse, Error> {
    let records: Vec<QueuedRecord> = event
        .payload
        .records
        .into_iter()
        .map(|message| {
            QueuedRecord::new(
                message.message_id.unwrap_or_default(),
                message.body.unwrap_or_default(),
            )
        })
        .collect();

    let limit = effective_timeout(timeout, Some(event.context.deadline));
    let outcome = with_deadline(limit, processor.process(&records)).await?;

    let mut response = SqsBatchResponse::default();
    response.batch_item_failures = outcome
        .failed
        .into_iter()
        .map(|message_id| {
            let mut failure = BatchItemFailure::default();
            failure.item_identifier = message_id;
            failure
        })
        .collect();
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_lambda_tracing();

    let config = CatalogConfig::load()?;
    let sdk = aws::load_sdk_config().await;
    let processor = Arc::new(
        BatchProcessor::new(
            Arc::new(aws::dynamo_store(&sdk, &config)),
            Arc::new(aws::sns_sink(&sdk, &config)?),
        )
        .with_coercion(config.numeric_coercion)
        .with_policy(config.notification_policy),
    );
    let timeout = config.batch_timeout();
    info!(
        coercion = ?config.numeric_coercion,
        policy = ?config.notification_policy,
        "initialising batch processor"
    );

    run(service_fn(move |event: LambdaEvent<SqsEvent>| {
        let processor = processor.clone();
        async move { handle(&processor, timeout, event).await }
    }))
    .await
}
