//! In-memory object bucket for local runs and tests.

use super::{ImportError, ObjectSource, UploadSigner};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Objects keyed by `(bucket, key)`. Signed URLs use a `memory://` scheme.
#[derive(Default)]
pub struct MemoryObjects {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_object(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), data.into());
    }
}

#[async_trait]
impl ObjectSource for MemoryObjects {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ImportError> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| ImportError::Fetch {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "NoSuchKey".to_string(),
            })
    }
}

#[async_trait]
impl UploadSigner for MemoryObjects {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ImportError> {
        Ok(format!(
            "memory://uploads/{key}?content-type={content_type}&expires={}",
            expires_in.as_secs()
        ))
    }
}
