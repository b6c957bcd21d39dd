//! Lambda entrypoint for the API Gateway TOKEN authorizer guarding `/import`.
//!
//! Returning the `Unauthorized` error makes API Gateway answer 401; a `Deny` policy
//! makes it answer 403.

use catalog_framework::tracing::setup_lambda_tracing;
use catalog_service::auth::{authorize, AuthorizerResponse, EnvCredentials, TokenAuthorizerRequest};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

async fn handle(event: LambdaEvent<TokenAuthorizerRequest>) -> Result<AuthorizerResponse, Error> {
    Ok(authorize(&event.payload, &EnvCredentials)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_lambda_tracing();
    run(service_fn(handle)).await
}
