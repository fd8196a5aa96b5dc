//! S3-compatible media storage (Cloudflare R2).
//!
//! The pipeline relays exported clips into its own bucket so delivered
//! links do not depend on the provider's URL lifetime.

pub mod client;
pub mod error;

pub use client::{clip_key, MediaStorage, StorageConfig};
pub use error::{StorageError, StorageResult};
