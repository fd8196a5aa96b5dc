//! Demo records table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use demogen_models::{Demo, DemoId, DemoStatus};

use crate::client::RowStoreClient;
use crate::error::StoreResult;

const TABLE: &str = "demos";

/// Partial update for a demo row. `None` fields are left untouched.
#[derive(Debug, Clone, Serialize)]
pub struct DemoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DemoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_video_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl DemoUpdate {
    fn new() -> Self {
        Self {
            status: None,
            long_video_url: None,
            short_video_urls: None,
            error_message: None,
            updated_at: Utc::now(),
        }
    }

    /// Status-only update.
    pub fn status(status: DemoStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::new()
        }
    }

    /// Terminal failure: status `failed` plus the reason.
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: Some(DemoStatus::Failed),
            error_message: Some(error_message.into()),
            ..Self::new()
        }
    }

    /// Recording done: store the long video and advance to `processing`.
    pub fn recorded(long_video_url: impl Into<String>) -> Self {
        Self {
            status: Some(DemoStatus::Processing),
            long_video_url: Some(long_video_url.into()),
            ..Self::new()
        }
    }

    /// Clips exported: store the short URLs and advance to `sending`.
    pub fn clips_ready(short_video_urls: Vec<String>) -> Self {
        Self {
            status: Some(DemoStatus::Sending),
            short_video_urls: Some(short_video_urls),
            ..Self::new()
        }
    }
}

/// Demo records store.
#[derive(Clone)]
pub struct DemoStore {
    client: RowStoreClient,
}

impl DemoStore {
    /// Create a new demo store over a row store client.
    pub fn new(client: RowStoreClient) -> Self {
        Self { client }
    }

    /// Fetch a demo by id. Returns `Ok(None)` when no row matches.
    pub async fn get(&self, demo_id: &DemoId) -> StoreResult<Option<Demo>> {
        let path = format!("{}?id=eq.{}&select=*", TABLE, demo_id);
        let rows: Vec<Demo> = self.client.get_json(&path).await?;
        Ok(rows.into_iter().next())
    }

    /// Apply a partial update to a demo row.
    pub async fn update(&self, demo_id: &DemoId, update: DemoUpdate) -> StoreResult<()> {
        let path = format!("{}?id=eq.{}", TABLE, demo_id);
        let body = serde_json::to_value(&update)?;
        let updated = self.client.patch_rows(&path, &body).await?;

        if updated == 0 {
            warn!(demo_id = %demo_id, "Demo update matched no rows");
        } else {
            debug!(demo_id = %demo_id, status = ?update.status, "Demo updated");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RowStoreConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn demos(server: &MockServer) -> DemoStore {
        let client = RowStoreClient::new(RowStoreConfig {
            base_url: server.uri(),
            api_key: "svc-key".to_string(),
            timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
        })
        .unwrap();
        DemoStore::new(client)
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_demo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demos"))
            .and(query_param("id", "eq.d-missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let demo = demos(&server).await.get(&"d-missing".into()).await.unwrap();
        assert!(demo.is_none());
    }

    #[tokio::test]
    async fn get_decodes_a_matching_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demos"))
            .and(query_param("id", "eq.d-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": "d-1",
                "user_id": "u-1",
                "product_url": "https://example.com",
                "description": "landing page tour",
                "status": "pending",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }])))
            .mount(&server)
            .await;

        let demo = demos(&server).await.get(&"d-1".into()).await.unwrap().unwrap();
        assert_eq!(demo.status, DemoStatus::Pending);
        assert_eq!(demo.description, "landing page tour");
    }

    #[test]
    fn update_serializes_only_set_fields() {
        let update = DemoUpdate::failed("recording failed");
        let value = serde_json::to_value(&update).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["status"], "failed");
        assert_eq!(object["error_message"], "recording failed");
        assert!(!object.contains_key("long_video_url"));
        assert!(!object.contains_key("short_video_urls"));
        assert!(object.contains_key("updated_at"));
    }

    #[test]
    fn recorded_update_advances_to_processing() {
        let update = DemoUpdate::recorded("https://cdn.example.com/long.webm");
        assert_eq!(update.status, Some(DemoStatus::Processing));
        assert_eq!(
            update.long_video_url.as_deref(),
            Some("https://cdn.example.com/long.webm")
        );
    }

    #[test]
    fn clips_ready_update_advances_to_sending() {
        let update = DemoUpdate::clips_ready(vec!["a".into(), "b".into()]);
        assert_eq!(update.status, Some(DemoStatus::Sending));
        assert_eq!(update.short_video_urls.as_ref().unwrap().len(), 2);
    }
}
