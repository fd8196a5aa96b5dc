//! Clip provider objects.
//!
//! These mirror the provider's task/candidate/export lifecycle objects.
//! They are transient: polled until terminal, never persisted by the core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of clips selected for export per demo.
pub const MAX_EXPORTED_CLIPS: usize = 3;

/// Status of an asynchronous provider task or export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipTaskStatus {
    /// Still running on the provider side
    Processing,
    /// Finished, output available
    Ready,
    /// Finished with a provider-side error
    Error,
}

impl ClipTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipTaskStatus::Processing => "processing",
            ClipTaskStatus::Ready => "ready",
            ClipTaskStatus::Error => "error",
        }
    }

    /// Check if this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClipTaskStatus::Ready | ClipTaskStatus::Error)
    }
}

impl fmt::Display for ClipTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A clip-generation task submitted to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipTask {
    /// Provider task ID
    pub id: String,
    /// Current status
    pub status: ClipTaskStatus,
    /// Container (folder) holding the generated candidates, set when ready
    #[serde(default)]
    pub output_id: Option<String>,
    /// Provider error text, set when status is `error`
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A generated clip candidate inside an output container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipCandidate {
    /// Provider project ID
    pub id: String,
    /// Provider-assigned virality score in [0, 100]
    pub virality_score: f64,
}

/// An export request for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipExport {
    /// Provider export ID
    pub id: String,
    /// Candidate the export was created from
    pub project_id: String,
    /// Container scope, when the provider reports one
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Current status
    pub status: ClipTaskStatus,
    /// Final asset URL, set when ready
    #[serde(default)]
    pub src_url: Option<String>,
    /// Provider error text, set when status is `error`
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Select the best candidates for export.
///
/// Candidates are ordered by virality score descending and capped at
/// [`MAX_EXPORTED_CLIPS`]. The sort is stable, so candidates with equal
/// scores keep the provider's listing order.
pub fn select_top_candidates(mut candidates: Vec<ClipCandidate>) -> Vec<ClipCandidate> {
    candidates.sort_by(|a, b| {
        b.virality_score
            .partial_cmp(&a.virality_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(MAX_EXPORTED_CLIPS);
    candidates
}
