//! Task queue table.
//!
//! The claim is a single store-side RPC that flips one pending row to
//! `processing` and returns it; that RPC is the only mutual-exclusion
//! primitive between concurrent claimers. Terminal writes are filtered on
//! `status=eq.processing`, so repeating one matches zero rows.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use demogen_models::{QueueItem, TaskPayload, TaskStatus};

use crate::client::RowStoreClient;
use crate::error::{StoreError, StoreResult};

const TABLE: &str = "task_queue";
const CLAIM_RPC: &str = "rpc/claim_next_task";

/// Task queue store.
#[derive(Clone)]
pub struct TaskQueueStore {
    client: RowStoreClient,
}

impl TaskQueueStore {
    /// Create a new queue store over a row store client.
    pub fn new(client: RowStoreClient) -> Self {
        Self { client }
    }

    /// Atomically claim the next pending item, marking it `processing`.
    ///
    /// An empty queue is signaled by a null row (or a row with a null id)
    /// and returned as `Ok(None)`; only genuine I/O or API failures are
    /// errors.
    pub async fn claim_next(&self) -> StoreResult<Option<QueueItem>> {
        let row: serde_json::Value = self.client.post_json(CLAIM_RPC, &json!({})).await?;

        if row.is_null() || row.get("id").map_or(true, |id| id.is_null()) {
            debug!("No pending tasks in queue");
            return Ok(None);
        }

        let item: QueueItem = serde_json::from_value(row)?;
        debug!(task_id = %item.id, task_type = %item.task_type, "Claimed task");
        Ok(Some(item))
    }

    /// Insert a new pending item, returning its generated id.
    pub async fn insert(&self, task: &TaskPayload) -> StoreResult<String> {
        let body = json!({
            "task_type": task.task_type(),
            "payload": task.payload_json(),
            "status": TaskStatus::Pending.as_str(),
        });

        let rows: Vec<QueueItem> = self.client.post_json(TABLE, &body).await?;
        rows.into_iter()
            .next()
            .map(|item| item.id)
            .ok_or_else(|| StoreError::invalid_response("insert returned no rows"))
    }

    /// Mark a claimed item completed. Idempotent: a repeat call (or a call
    /// against an already-finalized item) matches zero rows.
    pub async fn mark_completed(&self, task_id: &str) -> StoreResult<()> {
        self.finalize(task_id, TaskStatus::Completed, None).await
    }

    /// Mark a claimed item failed with an error message. Idempotent in the
    /// same way as [`mark_completed`](Self::mark_completed).
    pub async fn mark_failed(&self, task_id: &str, error_message: &str) -> StoreResult<()> {
        self.finalize(task_id, TaskStatus::Failed, Some(error_message))
            .await
    }

    async fn finalize(
        &self,
        task_id: &str,
        status: TaskStatus,
        error_message: Option<&str>,
    ) -> StoreResult<()> {
        let mut body = json!({
            "status": status.as_str(),
            "completed_at": Utc::now(),
        });
        if let Some(message) = error_message {
            body["error_message"] = json!(message);
        }

        let path = format!(
            "{}?id=eq.{}&status=eq.{}",
            TABLE,
            task_id,
            TaskStatus::Processing.as_str()
        );
        let updated = self.client.patch_rows(&path, &body).await?;

        if updated == 0 {
            warn!(task_id, status = %status, "Terminal write matched no rows (already finalized?)");
        } else {
            debug!(task_id, status = %status, "Task finalized");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RowStoreConfig;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn store(server: &MockServer) -> TaskQueueStore {
        let client = RowStoreClient::new(RowStoreConfig {
            base_url: server.uri(),
            api_key: "svc-key".to_string(),
            timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
        })
        .unwrap();
        TaskQueueStore::new(client)
    }

    #[tokio::test]
    async fn claim_returns_item_when_a_row_is_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/claim_next_task"))
            .and(header("apikey", "svc-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "task-1",
                "task_type": "process_demo",
                "payload": {"demo_id": "d-1", "user_email": "u@example.com"},
                "status": "processing",
                "created_at": "2024-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let item = store(&server).await.claim_next().await.unwrap().unwrap();
        assert_eq!(item.id, "task-1");
        assert_eq!(item.status, TaskStatus::Processing);
    }

    #[tokio::test]
    async fn claim_treats_null_row_as_empty_queue() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/claim_next_task"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Null))
            .mount(&server)
            .await;

        assert!(store(&server).await.claim_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn claim_treats_null_id_row_as_empty_queue() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/claim_next_task"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": null})),
            )
            .mount(&server)
            .await;

        assert!(store(&server).await.claim_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_claims_yield_one_item_and_empty_for_the_rest() {
        let server = MockServer::start().await;
        // The claim RPC hands the single pending row to exactly one caller.
        Mock::given(method("POST"))
            .and(path("/rpc/claim_next_task"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "task-1",
                "task_type": "process_demo",
                "payload": {"demo_id": "d-1", "user_email": "u@example.com"},
                "status": "processing",
                "created_at": "2024-01-01T00:00:00Z"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/claim_next_task"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Null))
            .mount(&server)
            .await;

        let queue = store(&server).await;
        let mut handles = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move { queue.claim_next().await.unwrap() }));
        }

        let mut claimed = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                claimed += 1;
            }
        }
        assert_eq!(claimed, 1);
    }

    #[tokio::test]
    async fn claim_surfaces_genuine_io_failures_as_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/claim_next_task"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .mount(&server)
            .await;

        match store(&server).await.claim_next().await {
            Err(StoreError::RequestFailed { status, .. }) => assert_eq!(status, 500),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn terminal_writes_filter_on_processing_status() {
        let server = MockServer::start().await;
        // Zero matched rows: the store answers with an empty representation.
        Mock::given(method("PATCH"))
            .and(path("/task_queue"))
            .and(query_param("id", "eq.task-9"))
            .and(query_param("status", "eq.processing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let queue = store(&server).await;
        // Both calls are no-ops against an already-finalized item.
        queue.mark_completed("task-9").await.unwrap();
        queue.mark_failed("task-9", "boom").await.unwrap();
    }

    #[tokio::test]
    async fn insert_returns_the_generated_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/task_queue"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([{
                "id": "task-new",
                "task_type": "process_demo",
                "payload": {"demo_id": "d-1", "user_email": "u@example.com"},
                "status": "pending",
                "created_at": "2024-01-01T00:00:00Z"
            }])))
            .mount(&server)
            .await;

        let payload = TaskPayload::ProcessDemo(demogen_models::ProcessDemoPayload {
            demo_id: "d-1".into(),
            user_email: "u@example.com".to_string(),
        });
        let id = store(&server).await.insert(&payload).await.unwrap();
        assert_eq!(id, "task-new");
    }
}
