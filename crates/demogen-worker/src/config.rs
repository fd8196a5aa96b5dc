//! Worker configuration.

use std::time::Duration;

fn env_secs(name: &str, default: u64) -> Duration {
    Duration::from_secs(
        std::env::var(name)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default),
    )
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between polls when the queue is empty
    pub poll_interval: Duration,
    /// Back-off after a claim I/O failure
    pub error_backoff: Duration,
    /// Total wait ceiling for clip generation
    pub task_max_wait: Duration,
    /// Poll interval while waiting for clip generation
    pub task_poll_interval: Duration,
    /// Total wait ceiling for one clip export
    pub export_max_wait: Duration,
    /// Poll interval while waiting for one clip export
    pub export_poll_interval: Duration,
    /// Language code passed to the clip provider
    pub clip_language: String,
    /// Maximum duration of each generated clip, seconds
    pub clip_max_duration: u32,
    /// Maximum number of clips the provider should generate
    pub clip_max_count: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            error_backoff: Duration::from_secs(10),
            task_max_wait: Duration::from_secs(600),
            task_poll_interval: Duration::from_secs(10),
            export_max_wait: Duration::from_secs(300),
            export_poll_interval: Duration::from_secs(5),
            clip_language: "en".to_string(),
            clip_max_duration: 30,
            clip_max_count: 10,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            poll_interval: env_secs("WORKER_POLL_INTERVAL_SECS", 5),
            error_backoff: env_secs("WORKER_ERROR_BACKOFF_SECS", 10),
            task_max_wait: env_secs("CLIP_TASK_MAX_WAIT_SECS", 600),
            task_poll_interval: env_secs("CLIP_TASK_POLL_SECS", 10),
            export_max_wait: env_secs("CLIP_EXPORT_MAX_WAIT_SECS", 300),
            export_poll_interval: env_secs("CLIP_EXPORT_POLL_SECS", 5),
            clip_language: std::env::var("CLIP_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            clip_max_duration: std::env::var("CLIP_MAX_DURATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            clip_max_count: std::env::var("CLIP_MAX_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }
}
