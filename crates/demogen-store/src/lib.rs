//! REST row store client.
//!
//! This crate provides:
//! - A tuned HTTP client for the PostgREST-style row store
//! - The task queue table with its atomic claim operation
//! - The demo records table with per-stage partial updates

pub mod client;
pub mod demos;
pub mod error;
pub mod queue;

pub use client::{RowStoreClient, RowStoreConfig};
pub use demos::{DemoStore, DemoUpdate};
pub use error::{StoreError, StoreResult};
pub use queue::TaskQueueStore;
