//! HTTP client for the PostgREST-style row store.
//!
//! One pooled reqwest client with explicit timeouts and service-key auth
//! headers; table stores wrap it with typed operations.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Row store client configuration.
#[derive(Debug, Clone)]
pub struct RowStoreConfig {
    /// Base URL of the REST interface (e.g. `https://db.example.com/rest/v1`)
    pub base_url: String,
    /// Service key sent as both `apikey` and bearer token
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl RowStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let base_url = std::env::var("DB_API_URL")
            .map_err(|_| StoreError::config_error("DB_API_URL not set"))?;
        let api_key = std::env::var("DB_SERVICE_KEY")
            .map_err(|_| StoreError::config_error("DB_SERVICE_KEY not set"))?;

        let timeout_secs: u64 = std::env::var("DB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(5),
        })
    }
}

/// Pooled HTTP client for the row store.
#[derive(Clone)]
pub struct RowStoreClient {
    http: Client,
    base_url: String,
}

impl RowStoreClient {
    /// Create a new client from configuration.
    pub fn new(config: RowStoreConfig) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(&config.api_key)
            .map_err(|_| StoreError::config_error("DB_SERVICE_KEY contains invalid characters"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| StoreError::config_error("DB_SERVICE_KEY contains invalid characters"))?;
        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(RowStoreConfig::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a path, decoding the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> StoreResult<T> {
        debug!(path, "row store GET");
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    /// POST a JSON body, decoding the JSON response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> StoreResult<T> {
        debug!(path, "row store POST");
        let response = self
            .http
            .post(self.url(path))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// PATCH rows matched by the path's filters. Returns the number of
    /// rows the update touched.
    pub async fn patch_rows(&self, path: &str, body: &serde_json::Value) -> StoreResult<u64> {
        debug!(path, "row store PATCH");
        let response = self
            .http
            .patch(self.url(path))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = Self::decode(response).await?;
        Ok(rows.len() as u64)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::error_for(status, message));
        }
        Ok(response.json().await?)
    }

    fn error_for(status: StatusCode, message: String) -> StoreError {
        if status == StatusCode::NOT_FOUND {
            StoreError::not_found(message)
        } else {
            StoreError::request_failed(status.as_u16(), message)
        }
    }
}
