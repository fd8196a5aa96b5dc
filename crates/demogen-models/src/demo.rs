//! Demo record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a demo record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemoId(pub String);

impl DemoId {
    /// Generate a new random demo ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DemoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DemoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DemoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DemoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Demo pipeline status.
///
/// The non-terminal statuses form an ordered stage sequence; a demo only
/// moves forward along it. `Failed` is terminal and reachable from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DemoStatus {
    /// Created, waiting for a worker to pick it up
    #[default]
    Pending,
    /// Browser recording in progress
    Recording,
    /// Recording stored, source video being prepared for clip generation
    Processing,
    /// Clip generation submitted / in progress
    Generating,
    /// Clips ready, completion email being sent
    Sending,
    /// Pipeline finished successfully
    Completed,
    /// Pipeline halted with an error
    Failed,
}

impl DemoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoStatus::Pending => "pending",
            DemoStatus::Recording => "recording",
            DemoStatus::Processing => "processing",
            DemoStatus::Generating => "generating",
            DemoStatus::Sending => "sending",
            DemoStatus::Completed => "completed",
            DemoStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, DemoStatus::Completed | DemoStatus::Failed)
    }

    /// Position of a non-terminal status in the stage order.
    fn rank(&self) -> u8 {
        match self {
            DemoStatus::Pending => 0,
            DemoStatus::Recording => 1,
            DemoStatus::Processing => 2,
            DemoStatus::Generating => 3,
            DemoStatus::Sending => 4,
            DemoStatus::Completed => 5,
            DemoStatus::Failed => 6,
        }
    }

    /// Whether a transition from `self` to `next` respects the stage order.
    ///
    /// Forward moves (including skips) are allowed, `Failed` is reachable
    /// from any non-terminal state, and nothing leaves a terminal state.
    pub fn can_transition_to(&self, next: DemoStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == DemoStatus::Failed {
            return true;
        }
        next.rank() > self.rank()
    }
}

impl fmt::Display for DemoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A demo record as stored in the row store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demo {
    /// Unique demo ID
    pub id: DemoId,
    /// Owning user
    pub user_id: String,
    /// Product page to record
    pub product_url: String,
    /// Free-form description, used as the recording instruction
    #[serde(default)]
    pub description: String,
    /// Current pipeline status
    pub status: DemoStatus,
    /// Long-form recording URL, set once recording succeeds
    #[serde(default)]
    pub long_video_url: Option<String>,
    /// Exported short clip URLs, ordered by descending virality score
    #[serde(default)]
    pub short_video_urls: Vec<String>,
    /// Failure reason, set iff status is `failed`
    #[serde(default)]
    pub error_message: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl Demo {
    /// Human-readable product name for notifications: the host of the
    /// product URL, falling back to the raw string if it does not parse.
    pub fn product_name(&self) -> String {
        url::Url::parse(&self.product_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| self.product_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_order_is_monotonic() {
        assert!(DemoStatus::Pending.can_transition_to(DemoStatus::Recording));
        assert!(DemoStatus::Recording.can_transition_to(DemoStatus::Processing));
        assert!(DemoStatus::Processing.can_transition_to(DemoStatus::Generating));
        assert!(DemoStatus::Generating.can_transition_to(DemoStatus::Sending));
        assert!(DemoStatus::Sending.can_transition_to(DemoStatus::Completed));

        // No backwards moves
        assert!(!DemoStatus::Generating.can_transition_to(DemoStatus::Recording));
        assert!(!DemoStatus::Sending.can_transition_to(DemoStatus::Pending));
    }

    #[test]
    fn failed_is_reachable_from_any_non_terminal_state() {
        for status in [
            DemoStatus::Pending,
            DemoStatus::Recording,
            DemoStatus::Processing,
            DemoStatus::Generating,
            DemoStatus::Sending,
        ] {
            assert!(status.can_transition_to(DemoStatus::Failed));
        }
    }

    #[test]
    fn terminal_states_do_not_transition() {
        assert!(!DemoStatus::Completed.can_transition_to(DemoStatus::Failed));
        assert!(!DemoStatus::Failed.can_transition_to(DemoStatus::Pending));
        assert!(DemoStatus::Completed.is_terminal());
        assert!(DemoStatus::Failed.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&DemoStatus::Generating).unwrap();
        assert_eq!(json, "\"generating\"");
        let back: DemoStatus = serde_json::from_str("\"recording\"").unwrap();
        assert_eq!(back, DemoStatus::Recording);
    }

    #[test]
    fn product_name_is_the_url_host() {
        let json = r#"{
            "id": "d-1",
            "user_id": "u-1",
            "product_url": "https://app.example.com/pricing",
            "status": "pending",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let demo: Demo = serde_json::from_str(json).unwrap();
        assert_eq!(demo.product_name(), "app.example.com");
    }

    #[test]
    fn demo_deserializes_with_missing_optionals() {
        let json = r#"{
            "id": "d-1",
            "user_id": "u-1",
            "product_url": "https://example.com",
            "status": "pending",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let demo: Demo = serde_json::from_str(json).unwrap();
        assert_eq!(demo.description, "");
        assert!(demo.long_video_url.is_none());
        assert!(demo.short_video_urls.is_empty());
        assert!(demo.error_message.is_none());
    }
}
