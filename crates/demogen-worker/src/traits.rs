//! Collaborator seams.
//!
//! Each external collaborator is reached through a narrow trait so the
//! worker and pipeline take injected dependencies and tests substitute
//! fakes. The impls below delegate to the concrete clients.

use std::time::Duration;

use async_trait::async_trait;

use demogen_clients::{ClientResult, ClipsClient, MailerClient, RecorderClient, ShortsOptions, Waited};
use demogen_models::{
    ClipCandidate, ClipExport, ClipTask, Demo, DemoId, ProcessDemoPayload, QueueItem,
};
use demogen_store::{DemoStore, DemoUpdate, StoreResult, TaskQueueStore};
use demogen_storage::StorageResult;

use crate::error::WorkerResult;

/// The task queue: atomic claim plus idempotent terminal writes.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn claim_next(&self) -> StoreResult<Option<QueueItem>>;
    async fn mark_completed(&self, task_id: &str) -> StoreResult<()>;
    async fn mark_failed(&self, task_id: &str, message: &str) -> StoreResult<()>;
}

#[async_trait]
impl TaskQueue for TaskQueueStore {
    async fn claim_next(&self) -> StoreResult<Option<QueueItem>> {
        TaskQueueStore::claim_next(self).await
    }

    async fn mark_completed(&self, task_id: &str) -> StoreResult<()> {
        TaskQueueStore::mark_completed(self, task_id).await
    }

    async fn mark_failed(&self, task_id: &str, message: &str) -> StoreResult<()> {
        TaskQueueStore::mark_failed(self, task_id, message).await
    }
}

/// The demo record store.
#[async_trait]
pub trait DemoRepo: Send + Sync {
    async fn get(&self, demo_id: &DemoId) -> StoreResult<Option<Demo>>;
    async fn update(&self, demo_id: &DemoId, update: DemoUpdate) -> StoreResult<()>;
}

#[async_trait]
impl DemoRepo for DemoStore {
    async fn get(&self, demo_id: &DemoId) -> StoreResult<Option<Demo>> {
        DemoStore::get(self, demo_id).await
    }

    async fn update(&self, demo_id: &DemoId, update: DemoUpdate) -> StoreResult<()> {
        DemoStore::update(self, demo_id, update).await
    }
}

/// The browser recorder.
#[async_trait]
pub trait Recorder: Send + Sync {
    async fn record(&self, product_url: &str, instruction: &str) -> ClientResult<Option<String>>;
}

#[async_trait]
impl Recorder for RecorderClient {
    async fn record(&self, product_url: &str, instruction: &str) -> ClientResult<Option<String>> {
        RecorderClient::record(self, product_url, instruction).await
    }
}

/// The clip provider's submit/poll lifecycle.
#[async_trait]
pub trait ClipGenerator: Send + Sync {
    async fn submit_shorts(
        &self,
        source_video_url: &str,
        options: &ShortsOptions,
    ) -> ClientResult<ClipTask>;

    async fn wait_for_task(
        &self,
        task_id: &str,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> ClientResult<Waited<ClipTask>>;

    async fn list_candidates(&self, container_id: &str) -> ClientResult<Vec<ClipCandidate>>;

    async fn create_export(
        &self,
        container_id: &str,
        project_id: &str,
    ) -> ClientResult<ClipExport>;

    async fn wait_for_export(
        &self,
        export: &ClipExport,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> ClientResult<Waited<ClipExport>>;
}

#[async_trait]
impl ClipGenerator for ClipsClient {
    async fn submit_shorts(
        &self,
        source_video_url: &str,
        options: &ShortsOptions,
    ) -> ClientResult<ClipTask> {
        ClipsClient::submit_shorts(self, source_video_url, options).await
    }

    async fn wait_for_task(
        &self,
        task_id: &str,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> ClientResult<Waited<ClipTask>> {
        ClipsClient::wait_for_task_completion(self, task_id, max_wait, poll_interval).await
    }

    async fn list_candidates(&self, container_id: &str) -> ClientResult<Vec<ClipCandidate>> {
        ClipsClient::list_candidates(self, container_id).await
    }

    async fn create_export(
        &self,
        container_id: &str,
        project_id: &str,
    ) -> ClientResult<ClipExport> {
        ClipsClient::create_export(self, container_id, project_id).await
    }

    async fn wait_for_export(
        &self,
        export: &ClipExport,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> ClientResult<Waited<ClipExport>> {
        ClipsClient::wait_for_export_completion(self, export, max_wait, poll_interval).await
    }
}

/// The completion notifier.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_demo_videos(
        &self,
        to_email: &str,
        product_name: &str,
        description: &str,
        long_video_url: &str,
        short_video_urls: &[String],
    ) -> bool;
}

#[async_trait]
impl Notifier for MailerClient {
    async fn send_demo_videos(
        &self,
        to_email: &str,
        product_name: &str,
        description: &str,
        long_video_url: &str,
        short_video_urls: &[String],
    ) -> bool {
        MailerClient::send_demo_videos(
            self,
            to_email,
            product_name,
            description,
            long_video_url,
            short_video_urls,
        )
        .await
    }
}

/// Own-storage persistence for exported clips.
#[async_trait]
pub trait ClipStore: Send + Sync {
    /// Fetch the provider asset and store it under `(demo_id, ordinal)`,
    /// returning the durable URL.
    async fn store_clip(
        &self,
        demo_id: &DemoId,
        ordinal: usize,
        src_url: &str,
    ) -> StorageResult<String>;
}

/// Dispatch target for decoded queue payloads.
#[async_trait]
pub trait DemoProcessor: Send + Sync {
    async fn process_demo(&self, payload: &ProcessDemoPayload) -> WorkerResult<()>;
}
