//! Bounded ingest queue
//!
//! Events are buffered in a bounded channel and drained by a single
//! dispatcher. The dispatcher takes a semaphore permit before spawning each
//! pipeline, so at most `max_concurrent` pipelines run at once. When the
//! buffer is full, [`IngestQueue::submit`] waits.
//!
//! Shutdown: [`IngestQueue::shutdown`] closes intake, lets the dispatcher
//! drain what is already queued and waits for every in-flight pipeline to
//! reach a terminal state.

use std::sync::Arc;

use archiver_core::PipelineConfig;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::error::PipelineError;
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::transport::InboundEvent;

#[derive(Debug, Error)]
#[error("Ingest queue is closed")]
pub struct QueueClosed;

/// Counts of what the dispatcher ran, returned on shutdown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub archived: usize,
    pub ignored: usize,
    pub failed: usize,
    pub panicked: usize,
}

impl QueueStats {
    pub fn total(&self) -> usize {
        self.archived + self.ignored + self.failed + self.panicked
    }

    fn record(&mut self, result: Result<Result<Option<PipelineOutcome>, PipelineError>, JoinError>) {
        match result {
            Ok(Ok(Some(_))) => self.archived += 1,
            Ok(Ok(None)) => self.ignored += 1,
            Ok(Err(_)) => self.failed += 1,
            Err(e) => {
                tracing::error!(error = %e, "Pipeline task panicked");
                self.panicked += 1;
            }
        }
    }
}

pub struct IngestQueue<E> {
    sender: mpsc::Sender<E>,
    dispatcher: JoinHandle<QueueStats>,
}

impl<E> IngestQueue<E>
where
    E: InboundEvent + 'static,
{
    /// Start the dispatcher. Must be called inside a tokio runtime.
    pub fn start(pipeline: Arc<Pipeline>, config: PipelineConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

        tracing::info!(
            max_concurrent = config.max_concurrent,
            queue_capacity = config.queue_capacity,
            "Ingest queue started"
        );

        let dispatcher = tokio::spawn(Self::dispatch(pipeline, receiver, semaphore));
        Self { sender, dispatcher }
    }

    /// Queue an event, waiting while the queue is full.
    pub async fn submit(&self, event: E) -> Result<(), QueueClosed> {
        self.sender.send(event).await.map_err(|_| QueueClosed)
    }

    /// Free slots in the buffer right now.
    pub fn available_capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Stop intake, drain queued events and wait for in-flight pipelines.
    pub async fn shutdown(self) -> QueueStats {
        tracing::info!("Initiating ingest queue shutdown");
        drop(self.sender);

        let stats = match self.dispatcher.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Ingest dispatcher terminated abnormally");
                QueueStats::default()
            }
        };

        tracing::info!(
            archived = stats.archived,
            ignored = stats.ignored,
            failed = stats.failed,
            panicked = stats.panicked,
            "Ingest queue stopped"
        );
        stats
    }

    async fn dispatch(
        pipeline: Arc<Pipeline>,
        mut receiver: mpsc::Receiver<E>,
        semaphore: Arc<Semaphore>,
    ) -> QueueStats {
        let mut stats = QueueStats::default();
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                    stats.record(result);
                }
                next = receiver.recv() => {
                    let Some(event) = next else { break };

                    let permit = match Arc::clone(&semaphore).acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::error!("Pipeline semaphore closed, dropping event");
                            break;
                        }
                    };

                    let pipeline = Arc::clone(&pipeline);
                    in_flight.spawn(async move {
                        let _permit = permit;
                        pipeline.handle_event(&event).await
                    });
                }
            }
        }

        tracing::debug!(in_flight = in_flight.len(), "Waiting for in-flight pipelines");
        while let Some(result) = in_flight.join_next().await {
            stats.record(result);
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use archiver_core::{Attachment, Config};
    use archiver_processing::{TranscodeError, Transcoder};
    use archiver_storage::MemoryStore;
    use async_trait::async_trait;
    use std::path::Path;

    struct NoTranscoder;

    #[async_trait]
    impl Transcoder for NoTranscoder {
        async fn transcode(&self, _source: &Path, target: &Path) -> Result<(), TranscodeError> {
            Err(TranscodeError::MissingOutput {
                path: target.to_path_buf(),
            })
        }
    }

    struct Event {
        channel: &'static str,
        media: Option<&'static str>,
    }

    #[async_trait]
    impl InboundEvent for Event {
        fn channel_id(&self) -> &str {
            self.channel
        }

        fn has_attachment(&self) -> bool {
            self.media.is_some()
        }

        async fn attachment(&self) -> Result<Attachment, TransportError> {
            let media = self.media.ok_or(TransportError::NoAttachment)?;
            Ok(Attachment::new(self.channel, media, &b"payload"[..]))
        }
    }

    fn pipeline(dir: &Path) -> Arc<Pipeline> {
        let mut config = Config::from_lookup(|key| match key {
            "MONITORED_CHANNEL_ID" => Some("group".to_string()),
            "ROOT_FOLDER_NAME" => Some("Root".to_string()),
            "REMOTE_BACKEND" => Some("memory".to_string()),
            _ => None,
        })
        .unwrap();
        config.staging_dirs = archiver_core::StagingDirs::under(dir);

        Arc::new(Pipeline::new(
            &config,
            Arc::new(MemoryStore::new()),
            Arc::new(NoTranscoder),
        ))
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_events() {
        let dir = tempfile::tempdir().unwrap();
        let queue = IngestQueue::start(
            pipeline(dir.path()),
            PipelineConfig {
                max_concurrent: 1,
                queue_capacity: 8,
            },
        );

        for media in ["video/mp4", "image/jpeg", "text/x-vcard"] {
            queue
                .submit(Event {
                    channel: "group",
                    media: Some(media),
                })
                .await
                .unwrap();
        }
        queue
            .submit(Event {
                channel: "elsewhere",
                media: Some("video/mp4"),
            })
            .await
            .unwrap();
        queue
            .submit(Event {
                channel: "group",
                media: None,
            })
            .await
            .unwrap();
        queue
            .submit(Event {
                channel: "group",
                media: Some("audio/ogg; codecs=opus"),
            })
            .await
            .unwrap();

        let stats = queue.shutdown().await;

        assert_eq!(stats.archived, 3);
        assert_eq!(stats.ignored, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total(), 6);
    }
}
