//! Lambda entrypoint for the product routes:
//! `GET /products`, `GET /product/available`, `GET /products/{productId}`, `POST /products`.

use catalog_framework::tracing::setup_lambda_tracing;
use catalog_service::api::lambda::invocation_deadline;
use catalog_service::api::{self, ApiContext, ApiRequest};
use catalog_service::runtime::{aws, CatalogConfig};
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, Response};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    setup_lambda_tracing();

    let config = CatalogConfig::load()?;
    let sdk = aws::load_sdk_config().await;
    let ctx = Arc::new(
        ApiContext::new(config.api_timeout())
            .with_store(Arc::new(aws::dynamo_store(&sdk, &config)))
            .with_write_options(config.write_options()),
    );
    info!(
        products = %config.products_table_name,
        stock = %config.stock_table_name,
        "initialising catalog API"
    );

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
