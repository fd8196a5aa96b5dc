//! Shared data models for the demo generation backend.
//!
//! This crate provides Serde-serializable types for:
//! - Demo records and their pipeline status
//! - Queue items and typed task payloads
//! - Clip provider objects (tasks, candidates, exports)

pub mod clip;
pub mod demo;
pub mod task;

// Re-export common types
pub use clip::{
    select_top_candidates, ClipCandidate, ClipExport, ClipTask, ClipTaskStatus, MAX_EXPORTED_CLIPS,
};
pub use demo::{Demo, DemoId, DemoStatus};
pub use task::{PayloadError, ProcessDemoPayload, QueueItem, TaskPayload, TaskStatus};
