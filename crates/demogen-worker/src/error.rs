//! Worker error types.
//!
//! Stage-fatal failures carry the user-visible message stored on the demo
//! record; infrastructure errors wrap the originating crate's error. Both
//! surface to the worker loop, which marks the queue item failed and keeps
//! polling. Stage-tolerant failures (a skipped clip export) never become
//! errors at all.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    Stage(String),

    #[error("Demo not found: {0}")]
    DemoNotFound(String),

    #[error("Invalid task payload: {0}")]
    Payload(#[from] demogen_models::PayloadError),

    #[error("Store error: {0}")]
    Store(#[from] demogen_store::StoreError),

    #[error("Client error: {0}")]
    Client(#[from] demogen_clients::ClientError),

    #[error("Storage error: {0}")]
    Storage(#[from] demogen_storage::StorageError),
}

impl WorkerError {
    /// A stage-fatal failure with a user-visible message.
    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }

    /// Check if this is a stage-fatal failure (as opposed to an
    /// infrastructure error).
    pub fn is_stage_failure(&self) -> bool {
        matches!(self, WorkerError::Stage(_))
    }
}
