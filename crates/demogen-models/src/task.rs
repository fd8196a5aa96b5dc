//! Queue item models and typed task payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::demo::DemoId;

/// Queue item status.
///
/// Transitions only follow pending -> processing -> {completed, failed};
/// the atomic claim operation in the store performs the first hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for a worker to claim it
    #[default]
    Pending,
    /// Claimed by a worker
    Processing,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload for a `process_demo` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDemoPayload {
    /// Demo record to process
    pub demo_id: DemoId,
    /// Recipient for the completion email
    pub user_email: String,
}

/// Typed task payload, tagged by the queue item's `task_type` column.
///
/// Decoding happens once at the queue boundary; everything past the worker's
/// dispatch sees a concrete variant instead of a JSON blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task_type", content = "payload", rename_all = "snake_case")]
pub enum TaskPayload {
    /// Drive one demo through the full pipeline
    ProcessDemo(ProcessDemoPayload),
}

impl TaskPayload {
    /// The `task_type` discriminator stored alongside the payload.
    pub fn task_type(&self) -> &'static str {
        match self {
            TaskPayload::ProcessDemo(_) => "process_demo",
        }
    }

    /// The raw payload column value for this task.
    pub fn payload_json(&self) -> serde_json::Value {
        match self {
            TaskPayload::ProcessDemo(p) => {
                serde_json::to_value(p).expect("payload serializes")
            }
        }
    }
}

/// Errors decoding a queue item payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Invalid payload for task type {task_type}: {source}")]
    InvalidPayload {
        task_type: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A unit of work from the task queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    /// Unique item ID, generated at insertion
    pub id: String,
    /// Task discriminator (e.g. "process_demo")
    pub task_type: String,
    /// Opaque payload column, decoded via [`QueueItem::decode_payload`]
    pub payload: serde_json::Value,
    /// Current status
    pub status: TaskStatus,
    /// Failure reason, set only on failure
    #[serde(default)]
    pub error_message: Option<String>,
    /// When the item was inserted
    pub created_at: DateTime<Utc>,
    /// When the item reached a terminal status
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueItem {
    /// Decode the raw `task_type` + `payload` columns into a typed payload.
    ///
    /// An unrecognized `task_type` is a decode error, which the worker
    /// treats as an immediate item failure.
    pub fn decode_payload(&self) -> Result<TaskPayload, PayloadError> {
        let tagged = json!({
            "task_type": self.task_type,
            "payload": self.payload,
        });
        serde_json::from_value(tagged).map_err(|e| {
            if e.to_string().contains("unknown variant") {
                PayloadError::UnknownTaskType(self.task_type.clone())
            } else {
                PayloadError::InvalidPayload {
                    task_type: self.task_type.clone(),
                    source: e,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(task_type: &str, payload: serde_json::Value) -> QueueItem {
        QueueItem {
            id: "task-1".to_string(),
            task_type: task_type.to_string(),
            payload,
            status: TaskStatus::Processing,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn decodes_process_demo_payload() {
        let item = item(
            "process_demo",
            json!({"demo_id": "d-42", "user_email": "user@example.com"}),
        );

        match item.decode_payload().unwrap() {
            TaskPayload::ProcessDemo(p) => {
                assert_eq!(p.demo_id.as_str(), "d-42");
                assert_eq!(p.user_email, "user@example.com");
            }
        }
    }

    #[test]
    fn unknown_task_type_is_an_error() {
        let item = item("reticulate_splines", json!({}));
        match item.decode_payload() {
            Err(PayloadError::UnknownTaskType(t)) => assert_eq!(t, "reticulate_splines"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let item = item("process_demo", json!({"demo_id": "d-1"}));
        assert!(matches!(
            item.decode_payload(),
            Err(PayloadError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn payload_round_trips_through_columns() {
        let payload = TaskPayload::ProcessDemo(ProcessDemoPayload {
            demo_id: DemoId::from("d-7"),
            user_email: "a@b.co".to_string(),
        });

        let item = item(payload.task_type(), payload.payload_json());
        assert_eq!(item.decode_payload().unwrap(), payload);
    }

    #[test]
    fn task_status_terminality() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}
