//! Lambda entrypoint for `GET /import?name=...`: returns a pre-signed CSV upload URL.

use catalog_framework::tracing::setup_lambda_tracing;
use catalog_service::api::lambda::invocation_deadline;
use catalog_service::api::{self, ApiContext, ApiRequest};
use catalog_service::import::UploadService;
use catalog_service::runtime::{aws, CatalogConfig};
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    setup_lambda_tracing();

    let config = CatalogConfig::load()?;
    let sdk = aws::load_sdk_config().await;
    let uploads = UploadService::new(
        Arc::new(aws::s3_objects(&sdk, &config)?),
        config.upload_prefix.clone(),
        config.upload_expiry(),
    );
    let ctx = Arc::new(ApiContext::new(config.api_timeout()).with_uploads(Arc::new(uploads)));
    info!(bucket = ?config.bucket_name, prefix = %config.upload_prefix, "initialising import API");

    run(service_fn(move |request: Request| {
        let ctx = ctx.clone();
        async move {
            let deadline = invocation_deadline(&request);
            let response = api::handle(&ctx, ApiRequest::from(request), deadline).await;
            Ok::<_, LambdaError>(Response::<Body>::try_from(response)?)
        }
    }))
    .await
}
