//! S3-backed upload signing and object reads.

use super::{ImportError, ObjectSource, UploadSigner};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct S3Objects {
    client: Client,
    bucket: String,
}

impl S3Objects {
    /// `bucket` is where signed uploads land; reads name their bucket explicitly.
    pub fn new(config: &aws_config::SdkConfig, endpoint_url: Option<&str>, bucket: impl Into<String>) -> Self {
        let client = if let Some(endpoint) = endpoint_url {
            let s3_config = aws_sdk_s3::config::Builder::from(config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(config)
        };
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl UploadSigner for S3Objects {
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ImportError> {
        let sign_error = |reason: String| ImportError::Sign {
            key: key.to_string(),
            reason,
        };
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| sign_error(e.to_string()))?;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| sign_error(DisplayErrorContext(e).to_string()))?;
        Ok(request.uri().to_string())
    }
}

#[async_trait]
impl ObjectSource for S3Objects {
    #[instrument(skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ImportError> {
        let fetch_error = |reason: String| ImportError::Fetch {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| fetch_error(DisplayErrorContext(e).to_string()))?;
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| fetch_error(e.to_string()))?
            .into_bytes();
        debug!(bytes = data.len(), "Fetched object");
        Ok(data.to_vec())
    }
}
