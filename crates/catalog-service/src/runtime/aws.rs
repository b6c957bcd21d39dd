//! AWS-backed collaborators, built once per Lambda process from [`CatalogConfig`].

use super::config::{CatalogConfig, ConfigError};
use crate::import::S3Objects;
use crate::notify::SnsSink;
use crate::queue::SqsQueue;
use crate::store::DynamoStore;
use aws_config::{BehaviorVersion, SdkConfig};

pub async fn load_sdk_config() -> SdkConfig {
    aws_config::load_defaults(BehaviorVersion::latest()).await
}

pub fn dynamo_store(sdk: &SdkConfig, config: &CatalogConfig) -> DynamoStore {
    DynamoStore::new(
        sdk,
        config.aws_endpoint_url.as_deref(),
        &config.products_table_name,
        &config.stock_table_name,
    )
}

pub fn sns_sink(sdk: &SdkConfig, config: &CatalogConfig) -> Result<SnsSink, ConfigError> {
    Ok(SnsSink::new(
        sdk,
        config.aws_endpoint_url.as_deref(),
        config.require_topic_arn()?,
    ))
}

pub fn sqs_queue(sdk: &SdkConfig, config: &CatalogConfig) -> Result<SqsQueue, ConfigError> {
    Ok(SqsQueue::new(
        sdk,
        config.aws_endpoint_url.as_deref(),
        config.require_queue_url()?,
        config.queue_settings(),
    ))
}

pub fn s3_objects(sdk: &SdkConfig, config: &CatalogConfig) -> Result<S3Objects, ConfigError> {
    Ok(S3Objects::new(
        sdk,
        config.aws_endpoint_url.as_deref(),
        config.require_bucket()?,
    ))
}
