//! Demo pipeline orchestration.
//!
//! Drives one demo record from `pending` to a terminal status: record the
//! product walkthrough, generate short clips from the recording, export the
//! best candidates, relay them to own storage, and notify the requester.
//!
//! Failure handling is split by stage kind. A failed clip export is skipped
//! and the pipeline continues with the remaining candidates; every other
//! stage failure halts the pipeline and marks the demo `failed`. The `failed`
//! write happens in exactly one place, after the staged run returns.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use demogen_clients::{ShortsOptions, Waited};
use demogen_models::{
    select_top_candidates, ClipCandidate, ClipTaskStatus, Demo, DemoId, DemoStatus,
    ProcessDemoPayload,
};
use demogen_store::DemoUpdate;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::traits::{ClipGenerator, ClipStore, DemoProcessor, DemoRepo, Notifier, Recorder};

/// Orchestrates the demo generation stages over injected collaborators.
pub struct DemoPipeline {
    demos: Arc<dyn DemoRepo>,
    recorder: Arc<dyn Recorder>,
    clips: Arc<dyn ClipGenerator>,
    notifier: Arc<dyn Notifier>,
    clip_store: Arc<dyn ClipStore>,
    config: WorkerConfig,
}

impl DemoPipeline {
    pub fn new(
        demos: Arc<dyn DemoRepo>,
        recorder: Arc<dyn Recorder>,
        clips: Arc<dyn ClipGenerator>,
        notifier: Arc<dyn Notifier>,
        clip_store: Arc<dyn ClipStore>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            demos,
            recorder,
            clips,
            notifier,
            clip_store,
            config,
        }
    }

    fn shorts_options(&self) -> ShortsOptions {
        ShortsOptions {
            language: self.config.clip_language.clone(),
            max_duration: self.config.clip_max_duration,
            max_clip_count: self.config.clip_max_count,
        }
    }

    /// Run the staged pipeline for one demo. Never writes the `failed`
    /// status; stage failures surface as errors for the caller to record.
    async fn run(&self, demo: &Demo, user_email: &str) -> WorkerResult<()> {
        // Stage 1: record the product walkthrough.
        self.demos
            .update(&demo.id, DemoUpdate::status(DemoStatus::Recording))
            .await?;

        let long_video_url = self
            .recorder
            .record(&demo.product_url, &demo.description)
            .await?
            .ok_or_else(|| WorkerError::stage("Failed to record demo video"))?;

        info!(demo_id = %demo.id, long_video_url, "Recording complete");
        self.demos
            .update(&demo.id, DemoUpdate::recorded(&long_video_url))
            .await?;

        // Stage 2: generate short clips from the recording.
        self.demos
            .update(&demo.id, DemoUpdate::status(DemoStatus::Generating))
            .await?;

        let task = self
            .clips
            .submit_shorts(&long_video_url, &self.shorts_options())
            .await?;

        let task = match self
            .clips
            .wait_for_task(
                &task.id,
                self.config.task_max_wait,
                self.config.task_poll_interval,
            )
            .await?
        {
            Waited::Terminal(task) => task,
            Waited::TimedOut => return Err(WorkerError::stage("Clip generation timed out")),
        };

        if task.status == ClipTaskStatus::Error {
            let reason = task
                .error_message
                .unwrap_or_else(|| "Clip generation failed".to_string());
            return Err(WorkerError::stage(reason));
        }

        let container_id = task
            .output_id
            .ok_or_else(|| WorkerError::stage("Clip generation returned no output"))?;

        let candidates = self.clips.list_candidates(&container_id).await?;
        if candidates.is_empty() {
            return Err(WorkerError::stage("No clips generated"));
        }

        // Stage 3: export the best candidates. Export failures are skipped,
        // not fatal; an empty result set still advances the pipeline.
        let selected = select_top_candidates(candidates);
        let mut short_video_urls = Vec::with_capacity(selected.len());
        for (ordinal, candidate) in selected.iter().enumerate() {
            if let Some(url) = self
                .export_clip(&demo.id, &container_id, candidate, ordinal)
                .await
            {
                short_video_urls.push(url);
            }
        }

        info!(
            demo_id = %demo.id,
            exported = short_video_urls.len(),
            "Clip exports finished"
        );
        self.demos
            .update(&demo.id, DemoUpdate::clips_ready(short_video_urls.clone()))
            .await?;

        // Stage 4: notify the requester.
        let sent = self
            .notifier
            .send_demo_videos(
                user_email,
                &demo.product_name(),
                &demo.description,
                &long_video_url,
                &short_video_urls,
            )
            .await;
        if !sent {
            return Err(WorkerError::stage("Failed to send completion email"));
        }

        self.demos
            .update(&demo.id, DemoUpdate::status(DemoStatus::Completed))
            .await?;
        Ok(())
    }

    /// Export one candidate and relay the asset to own storage.
    ///
    /// Any failure along the way skips this clip: the error is logged and
    /// `None` is returned. A relay failure alone falls back to the
    /// provider's asset URL rather than dropping the clip.
    async fn export_clip(
        &self,
        demo_id: &DemoId,
        container_id: &str,
        candidate: &ClipCandidate,
        ordinal: usize,
    ) -> Option<String> {
        let export = match self.clips.create_export(container_id, &candidate.id).await {
            Ok(export) => export,
            Err(e) => {
                warn!(demo_id = %demo_id, candidate_id = %candidate.id, error = %e, "Export request failed, skipping clip");
                return None;
            }
        };

        let export = match self
            .clips
            .wait_for_export(
                &export,
                self.config.export_max_wait,
                self.config.export_poll_interval,
            )
            .await
        {
            Ok(Waited::Terminal(export)) => export,
            Ok(Waited::TimedOut) => {
                warn!(demo_id = %demo_id, candidate_id = %candidate.id, "Export timed out, skipping clip");
                return None;
            }
            Err(e) => {
                warn!(demo_id = %demo_id, candidate_id = %candidate.id, error = %e, "Export polling failed, skipping clip");
                return None;
            }
        };

        if export.status != ClipTaskStatus::Ready {
            warn!(
                demo_id = %demo_id,
                candidate_id = %candidate.id,
                error = export.error_message.as_deref().unwrap_or("unknown"),
                "Export ended in error, skipping clip"
            );
            return None;
        }

        let src_url = match export.src_url {
            Some(url) => url,
            None => {
                warn!(demo_id = %demo_id, candidate_id = %candidate.id, "Export ready without an asset URL, skipping clip");
                return None;
            }
        };

        match self.clip_store.store_clip(demo_id, ordinal, &src_url).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(demo_id = %demo_id, ordinal, error = %e, "Relay to own storage failed, keeping provider URL");
                Some(src_url)
            }
        }
    }
}

#[async_trait]
impl DemoProcessor for DemoPipeline {
    async fn process_demo(&self, payload: &ProcessDemoPayload) -> WorkerResult<()> {
        let demo = self
            .demos
            .get(&payload.demo_id)
            .await?
            .ok_or_else(|| WorkerError::DemoNotFound(payload.demo_id.to_string()))?;

        info!(demo_id = %demo.id, status = %demo.status, "Processing demo");

        match self.run(&demo, &payload.user_email).await {
            Ok(()) => {
                info!(demo_id = %demo.id, "Demo completed");
                Ok(())
            }
            Err(e) => {
                error!(demo_id = %demo.id, error = %e, "Demo failed");
                let update = DemoUpdate::failed(e.to_string());
                if let Err(write_err) = self.demos.update(&demo.id, update).await {
                    error!(demo_id = %demo.id, error = %write_err, "Could not record demo failure");
                }
                Err(e)
            }
        }
    }
}
