//! Lambda entrypoint for S3 `ObjectCreated` events on the import bucket: every uploaded
//! CSV row becomes one message on the ingestion queue.
//!
//! Import failures are logged and the invocation still succeeds, so S3 does not retry
//! the event and re-send rows that were already queued.

use aws_lambda_events::event::s3::S3Event;
use catalog_framework::tracing::setup_lambda_tracing;
use catalog_service::import::{decode_object_key, FileImporter};
use catalog_service::runtime::{aws, CatalogConfig};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::{info, warn};

async fn handle(importer: &FileImporter, event: LambdaEvent<S3Event>) -> Result<(), Error> {
    let mut objects = Vec::new();
    for record in event.payload.records {
        let (Some(bucket), Some(raw_key)) = (record.s3.bucket.name, record.s3.object.key) else {
            warn!("Skipping S3 record without bucket or key");
            continue;
        };
        objects.push((bucket, decode_object_key(&raw_key)));
    }

    let sent = importer.import_objects(&objects).await;
    info!(objects = objects.len(), sent, "Processed upload event");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_lambda_tracing();

    let config = CatalogConfig::load()?;
    let sdk = aws::load_sdk_config().await;
    let importer = Arc::new(FileImporter::new(
        Arc::new(aws::s3_objects(&sdk, &config)?),
        Arc::new(aws::sqs_queue(&sdk, &config)?),
        config.upload_prefix.clone(),
    ));
    info!(prefix = %config.upload_prefix, "initialising import file parser");

    run(service_fn(move |event: LambdaEvent<S3Event>| {
        let importer = importer.clone();
        async move { handle(&importer, event).await }
    }))
    .await
}
