//! # Configuration
//!
//! Settings come from the process environment through the `config` crate:
//!
//! - Flat variables set on each Lambda function (`PRODUCTS_TABLE_NAME`,
//!   `STOCK_TABLE_NAME`, `SNS_TOPIC_ARN`, `CATALOG_QUEUE_URL`, `BUCKET_NAME`,
//!   `AWS_ENDPOINT_URL`).
//! - `CATALOG__*` overrides for tunables, e.g. `CATALOG__BATCH_SIZE=10` or
//!   `CATALOG__NUMERIC_COERCION=strict`. These win over the flat variables.
//!
//! Anything unset takes the default below.

use crate::catalog::{NotificationPolicy, WriteOptions};
use crate::model::NumericCoercion;
use crate::queue::QueueSettings;
use ::config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Prefix for override environment variables.
pub const CONFIG_ENV_PREFIX: &str = "CATALOG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("Missing required setting {0}")]
    Missing(&'static str),
    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub products_table_name: String,
    pub stock_table_name: String,
    pub sns_topic_arn: Option<String>,
    pub catalog_queue_url: Option<String>,
    pub bucket_name: Option<String>,
    /// Points every AWS client at a local endpoint (LocalStack and the like).
    pub aws_endpoint_url: Option<String>,

    pub numeric_coercion: NumericCoercion,
    pub notification_policy: NotificationPolicy,
    pub init_stock_on_create: bool,

    pub api_timeout_secs: u64,
    pub batch_timeout_secs: u64,

    pub batch_size: usize,
    pub batching_window_secs: u64,
    pub visibility_timeout_secs: u64,
    pub max_receive_count: u32,

    pub upload_url_expiry_secs: u64,
    pub upload_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_table_name: "products".to_string(),
            stock_table_name: "stock".to_string(),
            sns_topic_arn: None,
            catalog_queue_url: None,
            bucket_name: None,
            aws_endpoint_url: None,
            numeric_coercion: NumericCoercion::Lenient,
            notification_policy: NotificationPolicy::BestEffort,
            init_stock_on_create: false,
            api_timeout_secs: 6,
            batch_timeout_secs: 300,
            batch_size: 5,
            batching_window_secs: 1,
            visibility_timeout_secs: 30,
            max_receive_count: 3,
            upload_url_expiry_secs: 900,
            upload_prefix: "uploaded/".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load from `vars` instead of the process environment when given.
    pub fn load_from(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .source(vars.clone()),
            )
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        let loaded: CatalogConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.batch_size) {
            return Err(ConfigError::Invalid {
                name: "batch_size",
                reason: format!("{} is outside 1..=10", self.batch_size),
            });
        }
        if self.max_receive_count == 0 {
            return Err(ConfigError::Invalid {
                name: "max_receive_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.products_table_name.is_empty() || self.stock_table_name.is_empty() {
            return Err(ConfigError::Invalid {
                name: "table names",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn require_topic_arn(&self) -> Result<&str, ConfigError> {
        self.sns_topic_arn.as_deref().ok_or(ConfigError::Missing("SNS_TOPIC_ARN"))
    }

    pub fn require_queue_url(&self) -> Result<&str, ConfigError> {
        self.catalog_queue_url
            .as_deref()
            .ok_or(ConfigError::Missing("CATALOG_QUEUE_URL"))
    }

    pub fn require_bucket(&self) -> Result<&str, ConfigError> {
        self.bucket_name.as_deref().ok_or(ConfigError::Missing("BUCKET_NAME"))
    }

    pub fn queue_settings(&self) -> QueueSettings {
        QueueSettings {
            batch_size: self.batch_size,
            batching_window: Duration::from_secs(self.batching_window_secs),
            visibility_timeout: Duration::from_secs(self.visibility_timeout_secs),
            max_receive_count: self.max_receive_count,
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            init_stock_on_create: self.init_stock_on_create,
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    pub fn upload_expiry(&self) -> Duration {
        Duration::from_secs(self.upload_url_expiry_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::load_from(Some(HashMap::new())).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.queue_settings(), QueueSettings::default());
        assert_eq!(config.api_timeout(), Duration::from_secs(6));
        assert_eq!(config.batch_timeout(), Duration::from_secs(300));
        assert!(!config.write_options().init_stock_on_create);
        assert!(matches!(
            config.require_topic_arn(),
            Err(ConfigError::Missing("SNS_TOPIC_ARN"))
        ));
    }

    #[test]
    fn test_flat_lambda_variables() {
        let config = CatalogConfig::load_from(Some(vars(&[
            ("PRODUCTS_TABLE_NAME", "shop-products"),
            ("STOCK_TABLE_NAME", "shop-stock"),
            ("SNS_TOPIC_ARN", "arn:aws:sns:eu-west-1:123456789012:createProductTopic"),
            ("CATALOG_QUEUE_URL", "https://sqs.eu-west-1.amazonaws.com/123456789012/catalogItemsQueue"),
            ("BUCKET_NAME", "import-bucket"),
        ])))
        .unwrap();

        assert_eq!(config.products_table_name, "shop-products");
        assert_eq!(config.stock_table_name, "shop-stock");
        assert_eq!(
            config.require_topic_arn().unwrap(),
            "arn:aws:sns:eu-west-1:123456789012:createProductTopic"
        );
        assert!(config.require_queue_url().unwrap().ends_with("catalogItemsQueue"));
        assert_eq!(config.require_bucket().unwrap(), "import-bucket");
    }

    #[test]
    fn test_prefixed_overrides() {
        let config = CatalogConfig::load_from(Some(vars(&[
            ("CATALOG__NUMERIC_COERCION", "strict"),
            ("CATALOG__NOTIFICATION_POLICY", "strict"),
            ("CATALOG__INIT_STOCK_ON_CREATE", "true"),
            ("CATALOG__BATCH_SIZE", "10"),
            ("CATALOG__VISIBILITY_TIMEOUT_SECS", "60"),
            ("CATALOG__UPLOAD_PREFIX", "incoming/"),
        ])))
        .unwrap();

        assert_eq!(config.numeric_coercion, NumericCoercion::Strict);
        assert_eq!(config.notification_policy, NotificationPolicy::Strict);
        assert!(config.init_stock_on_create);
        assert_eq!(config.queue_settings().batch_size, 10);
        assert_eq!(
            config.queue_settings().visibility_timeout,
            Duration::from_secs(60)
        );
        assert_eq!(config.upload_prefix, "incoming/");
    }

    #[test]
    fn test_out_of_range_batch_size_is_rejected() {
        let result = CatalogConfig::load_from(Some(vars(&[("CATALOG__BATCH_SIZE", "25")])));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "batch_size",
                ..
            })
        ));
    }
}
