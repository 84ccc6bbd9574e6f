//! Per-attachment pipeline
//!
//! `Received → Classified → Staged → (Transcoded) → FolderResolved → Uploaded
//! → (AccessGranted) → CleanedUp`. Any fatal step moves the attachment to
//! `Failed` and leaves the staged file on disk. Grant failures and cleanup
//! failures are logged and never undo the upload.

use std::sync::Arc;

use archiver_core::{
    Attachment, Classifier, Config, IdGenerator, MediaCategory, StagedFile, UploadRecord, UuidIds,
};
use archiver_processing::{transcode_staged, Transcoder};
use archiver_services::{AccessController, Cleanup, FolderResolver, GrantReport, Uploader};
use archiver_storage::{LocalStager, RemoteStore};
use tracing::field;

use crate::error::PipelineError;
use crate::state::PipelineState;
use crate::transport::InboundEvent;

/// Result of a pipeline that got the file archived.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub attachment_id: String,
    pub category: MediaCategory,
    pub final_state: PipelineState,
    pub upload: UploadRecord,
    /// `None` when the allow-list is empty.
    pub grants: Option<GrantReport>,
}

impl PipelineOutcome {
    pub fn is_cleaned_up(&self) -> bool {
        self.final_state == PipelineState::CleanedUp
    }
}

/// Tracks and logs state transitions for one attachment.
struct Progress<'a> {
    attachment_id: &'a str,
    state: PipelineState,
}

impl<'a> Progress<'a> {
    fn new(attachment_id: &'a str) -> Self {
        Self {
            attachment_id,
            state: PipelineState::Received,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        tracing::debug!(
            attachment_id = %self.attachment_id,
            from = %self.state,
            to = %next,
            "Pipeline transition"
        );
        self.state = next;
    }
}

pub struct Pipeline {
    monitored_channel_id: String,
    classifier: Classifier,
    ids: Arc<dyn IdGenerator>,
    stager: LocalStager,
    transcoder: Arc<dyn Transcoder>,
    resolver: FolderResolver,
    uploader: Uploader,
    access: AccessController,
    cleanup: Cleanup,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        store: Arc<dyn RemoteStore>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            monitored_channel_id: config.monitored_channel_id.clone(),
            classifier: Classifier::new(
                config.staging_dirs.clone(),
                config.root_folder_name.clone(),
            ),
            ids: Arc::new(UuidIds),
            stager: LocalStager::new(),
            transcoder,
            resolver: FolderResolver::new(Arc::clone(&store)),
            uploader: Uploader::new(Arc::clone(&store)),
            access: AccessController::new(store, config.access_allow_list.clone()),
            cleanup: Cleanup,
        }
    }

    /// Replace the identifier source (deterministic names in dry runs and tests).
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_stager(mut self, stager: LocalStager) -> Self {
        self.stager = stager;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &FolderResolver {
        &self.resolver
    }

    pub fn monitored_channel_id(&self) -> &str {
        &self.monitored_channel_id
    }

    /// Filter an inbound event and run the pipeline for its attachment.
    ///
    /// Returns `Ok(None)` for events from other channels and for events
    /// without an attachment.
    pub async fn handle_event(
        &self,
        event: &dyn InboundEvent,
    ) -> Result<Option<PipelineOutcome>, PipelineError> {
        if event.channel_id() != self.monitored_channel_id {
            tracing::trace!(channel_id = %event.channel_id(), "Ignoring event from unmonitored channel");
            return Ok(None);
        }

        tracing::debug!(
            channel_id = %event.channel_id(),
            body = event.body().unwrap_or_default(),
            "Monitored message received"
        );

        if !event.has_attachment() {
            tracing::info!(channel_id = %event.channel_id(), "Message without attachment ignored");
            return Ok(None);
        }

        let attachment = match event.attachment().await {
            Ok(attachment) => attachment,
            Err(e) => {
                tracing::error!(channel_id = %event.channel_id(), error = %e, "Failed to fetch attachment");
                return Err(e.into());
            }
        };

        self.process(attachment).await.map(Some)
    }

    /// Run one attachment through every stage.
    #[tracing::instrument(
        skip_all,
        fields(
            attachment_id = field::Empty,
            category = field::Empty,
            media_type = %attachment.media_type,
            size_bytes = attachment.len(),
        )
    )]
    pub async fn process(&self, attachment: Attachment) -> Result<PipelineOutcome, PipelineError> {
        let attachment_id = self.ids.next_id();
        let span = tracing::Span::current();
        span.record("attachment_id", field::display(&attachment_id));

        let mut progress = Progress::new(&attachment_id);
        match self.run(&attachment, &mut progress).await {
            Ok(outcome) => {
                tracing::info!(
                    file_id = %outcome.upload.remote_file_id,
                    file_name = %outcome.upload.file_name,
                    final_state = %outcome.final_state,
                    "Attachment archived"
                );
                Ok(outcome)
            }
            Err(e) => {
                progress.advance(PipelineState::Failed);
                tracing::error!(
                    error = %e,
                    error_kind = e.kind(),
                    failed_at = %e.failed_at(),
                    "Attachment pipeline failed"
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        attachment: &Attachment,
        progress: &mut Progress<'_>,
    ) -> Result<PipelineOutcome, PipelineError> {
        let classification = self
            .classifier
            .classify(&attachment.media_type, progress.attachment_id);
        tracing::Span::current().record("category", field::display(classification.category));
        progress.advance(PipelineState::Classified);

        let mut staged = self
            .stager
            .stage(
                &attachment.data,
                &classification.staging_path,
                &attachment.media_type,
            )
            .await
            .map_err(|source| PipelineError::Staging {
                failed_at: progress.state,
                source,
            })?;
        progress.advance(PipelineState::Staged);

        if classification.needs_transcode() {
            staged = transcode_staged(
                self.transcoder.as_ref(),
                staged,
                &classification.local_path,
            )
            .await
            .map_err(|source| PipelineError::Transcode {
                failed_at: progress.state,
                source,
            })?;
            progress.advance(PipelineState::Transcoded);
        }

        let folder_id = self
            .resolver
            .resolve(&classification.remote_folder_path)
            .await
            .map_err(|source| PipelineError::RemoteFolder {
                failed_at: progress.state,
                source,
            })?;
        tracing::debug!(folder_id = %folder_id, path = %classification.remote_folder_path, "Remote folder resolved");
        progress.advance(PipelineState::FolderResolved);

        let upload = self
            .uploader
            .upload(&staged, &classification.file_name, &folder_id)
            .await
            .map_err(|source| PipelineError::Upload {
                failed_at: progress.state,
                source,
            })?;
        progress.advance(PipelineState::Uploaded);

        let grants = if self.access.is_enabled() {
            let report = self.access.grant_all(&upload.remote_file_id).await;
            if !report.is_complete() {
                tracing::warn!(
                    file_id = %upload.remote_file_id,
                    granted = report.granted.len(),
                    failed = report.failed.len(),
                    "Some access grants failed"
                );
            }
            progress.advance(PipelineState::AccessGranted);
            Some(report)
        } else {
            None
        };

        self.clean_up(staged, progress).await;

        Ok(PipelineOutcome {
            attachment_id: progress.attachment_id.to_string(),
            category: classification.category,
            final_state: progress.state,
            upload,
            grants,
        })
    }

    async fn clean_up(&self, staged: StagedFile, progress: &mut Progress<'_>) {
        match self.cleanup.remove(staged).await {
            Ok(()) => progress.advance(PipelineState::CleanedUp),
            Err(e) => {
                tracing::error!(error = %e, "Failed to remove staged file after upload");
            }
        }
    }
}
