//! R2 client implementation.

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Deterministic object key for an exported short clip.
pub fn clip_key(demo_id: &str, ordinal: usize) -> String {
    format!("demos/{}/shorts/{}.mp4", demo_id, ordinal)
}

/// Configuration for the media storage client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// R2 endpoint URL (S3 API endpoint)
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region (usually "auto" for R2)
    pub region: String,
    /// Public base URL serving the bucket's objects
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("R2_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("R2_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("R2_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("R2_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("R2_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("R2_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("R2_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("R2_BUCKET_NAME not set"))?,
            region: std::env::var("R2_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: std::env::var("R2_PUBLIC_BASE_URL")
                .map_err(|_| StorageError::config_error("R2_PUBLIC_BASE_URL not set"))?,
        })
    }
}

/// Media storage client.
#[derive(Clone)]
pub struct MediaStorage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl MediaStorage {
    /// Create a new storage client from configuration.
    pub fn new(config: StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "r2",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(StorageConfig::from_env()?))
    }

    /// Upload bytes under a key, returning the public URL.
    pub async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        let url = self.public_url(key);
        info!("Uploaded {} -> {}", key, url);
        Ok(url)
    }

    /// Public URL for an object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keys_are_deterministic_per_demo_and_ordinal() {
        assert_eq!(clip_key("d-1", 0), "demos/d-1/shorts/0.mp4");
        assert_eq!(clip_key("d-1", 2), "demos/d-1/shorts/2.mp4");
        assert_ne!(clip_key("d-1", 0), clip_key("d-2", 0));
    }

    #[test]
    fn public_url_joins_base_and_key() {
        let storage = MediaStorage::new(StorageConfig {
            endpoint_url: "https://acct.r2.cloudflarestorage.com".to_string(),
            access_key_id: "ak".to_string(),
            secret_access_key: "sk".to_string(),
            bucket_name: "demos".to_string(),
            region: "auto".to_string(),
            public_base_url: "https://media.example.com/".to_string(),
        });
        assert_eq!(
            storage.public_url("demos/d-1/shorts/0.mp4"),
            "https://media.example.com/demos/d-1/shorts/0.mp4"
        );
    }
}
