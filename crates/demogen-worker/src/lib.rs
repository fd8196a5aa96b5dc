//! Demo processing worker.
//!
//! A single polling consumer over the task queue: claim one item, drive the
//! demo pipeline for it, record the item's terminal status, repeat. One
//! item's failure never stops the loop.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod relay;
pub mod traits;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use pipeline::DemoPipeline;
pub use relay::ClipRelay;
pub use worker::TaskWorker;
