//! Clip asset relay.
//!
//! Exported clips live on the provider's CDN with an unknown URL lifetime.
//! The relay downloads each asset and re-uploads it into our own bucket
//! under a deterministic key.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use demogen_models::DemoId;
use demogen_storage::{clip_key, MediaStorage, StorageError, StorageResult};

use crate::traits::ClipStore;

/// Downloads provider assets and persists them to [`MediaStorage`].
#[derive(Clone)]
pub struct ClipRelay {
    http: reqwest::Client,
    storage: MediaStorage,
}

impl ClipRelay {
    /// Create a new relay over a storage client.
    pub fn new(storage: MediaStorage) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StorageError::config_error(e.to_string()))?;

        Ok(Self { http, storage })
    }

    async fn download(&self, src_url: &str) -> StorageResult<Vec<u8>> {
        let response = self
            .http
            .get(src_url)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(format!("asset download failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StorageError::upload_failed(format!(
                "asset download failed with status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::upload_failed(format!("asset download failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ClipStore for ClipRelay {
    async fn store_clip(
        &self,
        demo_id: &DemoId,
        ordinal: usize,
        src_url: &str,
    ) -> StorageResult<String> {
        debug!(demo_id = %demo_id, ordinal, src_url, "Relaying clip asset");
        let data = self.download(src_url).await?;
        let key = clip_key(demo_id.as_str(), ordinal);
        self.storage.upload_bytes(data, &key, "video/mp4").await
    }
}
