//! Browser-recording service client.
//!
//! The recorder drives a headless browser over the product page, produces a
//! long-form screen recording, uploads it, and answers with the stored URL.
//! Recording runs for minutes, so the request timeout is generous.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};

/// Recorder client configuration.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Base URL of the recording service
    pub base_url: String,
    /// Request timeout; covers the whole browser session
    pub timeout: Duration,
}

impl RecorderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let base_url = std::env::var("RECORDER_URL")
            .map_err(|_| ClientError::config_error("RECORDER_URL not set"))?;

        let timeout_secs: u64 = std::env::var("RECORDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(600);

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Serialize)]
struct RecordRequest<'a> {
    product_url: &'a str,
    instruction: &'a str,
}

#[derive(Deserialize)]
struct RecordResponse {
    #[serde(default)]
    video_url: Option<String>,
}

/// Client for the browser-recording service.
#[derive(Clone)]
pub struct RecorderClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecorderClient {
    /// Create a new recorder client.
    pub fn new(config: RecorderConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(RecorderConfig::from_env()?)
    }

    /// Record a demo of `product_url`, guided by `instruction`.
    ///
    /// `Ok(None)` means the service finished without producing a video;
    /// callers treat that the same as an error status.
    pub async fn record(
        &self,
        product_url: &str,
        instruction: &str,
    ) -> ClientResult<Option<String>> {
        info!(product_url, "Starting browser recording");

        let response = self
            .http
            .post(format!("{}/record", self.base_url))
            .json(&RecordRequest {
                product_url,
                instruction,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Recording request failed");
            return Err(ClientError::request_failed(status.as_u16(), message));
        }

        let body: RecordResponse = response.json().await?;
        match &body.video_url {
            Some(url) => info!(video_url = %url, "Recording finished"),
            None => warn!("Recorder returned no video URL"),
        }
        Ok(body.video_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RecorderClient {
        RecorderClient::new(RecorderConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn record_returns_the_video_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/record"))
            .and(body_partial_json(
                serde_json::json!({"product_url": "https://example.com"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"video_url": "https://cdn.example.com/demo.webm"}),
            ))
            .mount(&server)
            .await;

        let url = client(&server)
            .record("https://example.com", "tour the pricing page")
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://cdn.example.com/demo.webm"));
    }

    #[tokio::test]
    async fn record_without_video_url_is_none_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/record"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let url = client(&server).record("https://example.com", "").await.unwrap();
        assert!(url.is_none());
    }

    #[tokio::test]
    async fn record_service_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/record"))
            .respond_with(ResponseTemplate::new(502).set_body_string("browser crashed"))
            .mount(&server)
            .await;

        let result = client(&server).record("https://example.com", "").await;
        assert!(matches!(
            result,
            Err(ClientError::RequestFailed { status: 502, .. })
        ));
    }
}
