//! Clip provider client.
//!
//! The provider turns one long video into a container of ranked short
//! clips. Generation and export are both asynchronous: submit, then poll
//! the returned object until it reaches a terminal status.

use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use demogen_models::{ClipCandidate, ClipExport, ClipTask};

use crate::error::{ClientError, ClientResult};
use crate::poll::{wait_until, Waited};

/// Default total wait for clip generation.
pub const TASK_MAX_WAIT: Duration = Duration::from_secs(600);
/// Default poll interval for clip generation.
pub const TASK_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Default total wait for a single export.
pub const EXPORT_MAX_WAIT: Duration = Duration::from_secs(300);
/// Default poll interval for a single export.
pub const EXPORT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Clip provider configuration.
#[derive(Debug, Clone)]
pub struct ClipsConfig {
    /// API base URL
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
    /// Request timeout for individual calls
    pub timeout: Duration,
}

impl ClipsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let api_key = std::env::var("CLIPS_API_KEY")
            .map_err(|_| ClientError::config_error("CLIPS_API_KEY not set"))?;

        Ok(Self {
            base_url: std::env::var("CLIPS_API_URL")
                .unwrap_or_else(|_| "https://api.klap.app/v2".to_string()),
            api_key,
            timeout: Duration::from_secs(60),
        })
    }
}

/// Options for a shorts-generation submission.
#[derive(Debug, Clone, Serialize)]
pub struct ShortsOptions {
    /// Language code for captions/analysis
    pub language: String,
    /// Maximum duration of each clip, seconds
    pub max_duration: u32,
    /// Maximum number of clips to generate
    pub max_clip_count: u32,
}

impl Default for ShortsOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            max_duration: 30,
            max_clip_count: 10,
        }
    }
}

/// Client for the clip provider API.
#[derive(Clone)]
pub struct ClipsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ClipsClient {
    /// Create a new clips client.
    pub fn new(config: ClipsConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClipsConfig::from_env()?)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::request_failed(status.as_u16(), message));
        }
        Ok(response.json().await?)
    }

    /// Submit a source video for shorts generation.
    pub async fn submit_shorts(
        &self,
        source_video_url: &str,
        options: &ShortsOptions,
    ) -> ClientResult<ClipTask> {
        info!(source_video_url, "Submitting video for clip generation");

        let body = json!({
            "source_video_url": source_video_url,
            "language": options.language,
            "max_duration": options.max_duration,
            "max_clip_count": options.max_clip_count,
        });

        let response = self.post("tasks/video-to-shorts").json(&body).send().await?;
        let task: ClipTask = Self::decode(response).await?;
        debug!(task_id = %task.id, "Clip task created");
        Ok(task)
    }

    /// Fetch the current status of a generation task.
    pub async fn task_status(&self, task_id: &str) -> ClientResult<ClipTask> {
        let response = self.get(&format!("tasks/{}", task_id)).send().await?;
        Self::decode(response).await
    }

    /// List generated clip candidates in an output container.
    ///
    /// The provider answers with either a bare array or an object wrapping
    /// a `projects` array; both shapes are accepted.
    pub async fn list_candidates(&self, container_id: &str) -> ClientResult<Vec<ClipCandidate>> {
        let response = self.get(&format!("projects/{}", container_id)).send().await?;
        let body: serde_json::Value = Self::decode(response).await?;

        let items = if body.is_array() {
            body
        } else if let Some(projects) = body.get("projects") {
            projects.clone()
        } else {
            warn!(container_id, "Unexpected candidate listing shape");
            return Ok(Vec::new());
        };

        Ok(serde_json::from_value(items)?)
    }

    /// Request an export for one candidate.
    pub async fn create_export(
        &self,
        container_id: &str,
        project_id: &str,
    ) -> ClientResult<ClipExport> {
        let response = self
            .post(&format!("projects/{}/{}/exports", container_id, project_id))
            .json(&json!({}))
            .send()
            .await?;
        let export: ClipExport = Self::decode(response).await?;
        debug!(export_id = %export.id, project_id, "Export created");
        Ok(export)
    }

    /// Fetch the current status of an export. Uses the container-scoped
    /// route when the export carries a folder id, the direct route
    /// otherwise.
    pub async fn export_status(&self, export: &ClipExport) -> ClientResult<ClipExport> {
        let path = match &export.folder_id {
            Some(folder_id) => format!(
                "projects/{}/{}/exports/{}",
                folder_id, export.project_id, export.id
            ),
            None => format!("projects/{}/exports/{}", export.project_id, export.id),
        };
        let response = self.get(&path).send().await?;
        Self::decode(response).await
    }

    /// Wait for a generation task to reach a terminal status.
    pub async fn wait_for_task_completion(
        &self,
        task_id: &str,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> ClientResult<Waited<ClipTask>> {
        wait_until(
            || self.task_status(task_id),
            |task: &ClipTask| task.status.is_terminal(),
            max_wait,
            poll_interval,
        )
        .await
    }

    /// Wait for an export to reach a terminal status.
    pub async fn wait_for_export_completion(
        &self,
        export: &ClipExport,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> ClientResult<Waited<ClipExport>> {
        wait_until(
            || self.export_status(export),
            |observed: &ClipExport| observed.status.is_terminal(),
            max_wait,
            poll_interval,
        )
        .await
    }
}
