//! Task queue consumer.
//!
//! A single polling loop: claim the oldest pending item, decode its payload,
//! dispatch it, and record the item's terminal status. Item failures are
//! recorded and the loop keeps going; only a shutdown signal stops it.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use demogen_models::{QueueItem, TaskPayload};

use crate::config::WorkerConfig;
use crate::traits::{DemoProcessor, TaskQueue};

/// Polling consumer over the task queue.
pub struct TaskWorker {
    queue: Arc<dyn TaskQueue>,
    processor: Arc<dyn DemoProcessor>,
    config: WorkerConfig,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TaskWorker {
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        processor: Arc<dyn DemoProcessor>,
        config: WorkerConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            queue,
            processor,
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Signal the polling loop to stop after the in-flight item, if any.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Run the polling loop until [`stop`](Self::stop) is called.
    pub async fn start(&self) {
        info!(
            poll_interval = ?self.config.poll_interval,
            "Task worker started"
        );
        let mut shutdown = self.shutdown_rx.clone();

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.queue.claim_next().await {
                Ok(Some(item)) => {
                    self.process(item).await;
                }
                Ok(None) => {
                    tokio::select! {
                        _ = shutdown.changed() => {}
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to claim a task, backing off");
                    tokio::select! {
                        _ = shutdown.changed() => {}
                        _ = tokio::time::sleep(self.config.error_backoff) => {}
                    }
                }
            }
        }

        info!("Task worker stopped");
    }

    /// Process one claimed item through to its terminal status.
    pub async fn process(&self, item: QueueItem) {
        info!(task_id = %item.id, task_type = %item.task_type, "Claimed task");

        let payload = match item.decode_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(task_id = %item.id, error = %e, "Undecodable task payload");
                self.finish_failed(&item.id, &e.to_string()).await;
                return;
            }
        };

        let outcome = match &payload {
            TaskPayload::ProcessDemo(p) => self.processor.process_demo(p).await,
        };

        match outcome {
            Ok(()) => {
                info!(task_id = %item.id, "Task completed");
                if let Err(e) = self.queue.mark_completed(&item.id).await {
                    error!(task_id = %item.id, error = %e, "Could not mark task completed");
                }
            }
            Err(e) => {
                warn!(task_id = %item.id, error = %e, "Task failed");
                self.finish_failed(&item.id, &e.to_string()).await;
            }
        }
    }

    async fn finish_failed(&self, task_id: &str, message: &str) {
        if let Err(e) = self.queue.mark_failed(task_id, message).await {
            error!(task_id, error = %e, "Could not mark task failed");
        }
    }
}
