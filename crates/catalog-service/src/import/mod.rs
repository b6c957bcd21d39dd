//! # CSV Import
//!
//! The two ends of file-based ingestion:
//!
//! - [`UploadService`] hands out pre-signed PUT URLs under the upload prefix.
//! - [`FileImporter`] reads an uploaded CSV object and enqueues one message per row.

pub mod memory;
pub mod rows;
pub mod s3;

use crate::queue::{AttributeValue, IngestionQueue, MessageAttributes, QueueError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

pub use memory::MemoryObjects;
pub use rows::{decode_object_key, parse_csv};
pub use s3::S3Objects;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Missing required parameter: name")]
    MissingName,
    #[error("Failed to sign upload for {key}: {reason}")]
    Sign { key: String, reason: String },
    #[error("Failed to fetch s3://{bucket}/{key}: {reason}")]
    Fetch {
        bucket: String,
        key: String,
        reason: String,
    },
    #[error("Malformed CSV in {key}: {source}")]
    Csv {
        key: String,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Issues pre-signed upload URLs.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ImportError>;
}

/// Reads uploaded objects.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ImportError>;
}

pub struct UploadService {
    signer: Arc<dyn UploadSigner>,
    prefix: String,
    expires_in: Duration,
}

impl UploadService {
    pub fn new(signer: Arc<dyn UploadSigner>, prefix: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            signer,
            prefix: prefix.into(),
            expires_in,
        }
    }

    /// Sign a CSV upload to `{prefix}{name}`.
    #[instrument(skip(self))]
    pub async fn request_upload(&self, name: Option<&str>) -> Result<String, ImportError> {
        let name = name.filter(|n| !n.is_empty()).ok_or(ImportError::MissingName)?;
        let key = format!("{}{}", self.prefix, name);
        let url = self
            .signer
            .presign_put(&key, CSV_CONTENT_TYPE, self.expires_in)
            .await?;
        info!(%key, expires_in = ?self.expires_in, "Signed upload URL");
        Ok(url)
    }
}

pub struct FileImporter {
    objects: Arc<dyn ObjectSource>,
    queue: Arc<dyn IngestionQueue>,
    prefix: String,
}

impl FileImporter {
    pub fn new(
        objects: Arc<dyn ObjectSource>,
        queue: Arc<dyn IngestionQueue>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            objects,
            queue,
            prefix: prefix.into(),
        }
    }

    /// Whether an object key is an uploaded CSV file.
    pub fn accepts(&self, key: &str) -> bool {
        key.starts_with(&self.prefix) && key.to_lowercase().ends_with(".csv")
    }

    /// Enqueue every row of an uploaded CSV object; returns the number of rows sent.
    ///
    /// Keys outside the upload prefix or without a `.csv` suffix are ignored. A row that
    /// fails to enqueue is logged and the remaining rows are still sent.
    #[instrument(skip(self))]
    pub async fn import_object(&self, bucket: &str, key: &str) -> Result<usize, ImportError> {
        if !self.accepts(key) {
            info!("Skipping object outside the upload prefix or not a CSV file");
            return Ok(0);
        }

        let data = self.objects.get_object(bucket, key).await?;
        let rows = parse_csv(&data).map_err(|source| ImportError::Csv {
            key: key.to_string(),
            source,
        })?;
        info!(rows = rows.len(), "Parsed CSV");

        let mut sent = 0;
        for (index, row) in rows.into_iter().enumerate() {
            let body = Value::Object(row).to_string();
            let attributes = MessageAttributes::from([
                ("sourceFile".to_string(), AttributeValue::Text(key.to_string())),
                ("recordNumber".to_string(), AttributeValue::Number(index as i64 + 1)),
            ]);
            match self.queue.send_with_attributes(body, attributes).await {
                Ok(message_id) => {
                    sent += 1;
                    debug!(row = index + 1, %message_id, "Enqueued row");
                }
                Err(e) => error!(row = index + 1, error = %e, "Failed to enqueue row"),
            }
        }

        info!(sent, "Import finished");
        Ok(sent)
    }

    /// Import several `(bucket, key)` objects, as delivered by one S3 event.
    ///
    /// A failed object is logged and the rest are still imported; nothing is returned
    /// as an error, so the event is not retried and rows already sent are not sent
    /// twice. Returns the total number of rows enqueued.
    pub async fn import_objects(&self, objects: &[(String, String)]) -> usize {
        let mut sent = 0;
        for (bucket, key) in objects {
            match self.import_object(bucket, key).await {
                Ok(rows) => sent += rows,
                Err(e) => error!(%bucket, %key, error = %e, "Import failed; skipping object"),
            }
        }
        sent
    }
}
