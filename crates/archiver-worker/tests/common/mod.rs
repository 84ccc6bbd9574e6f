#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use archiver_core::{AccessRole, Attachment, Config, SequentialIds, StagingDirs};
use archiver_processing::{TranscodeError, Transcoder};
use archiver_storage::{
    ContentReader, FileMetadata, LocalStager, MemoryStore, RemoteBackend, RemoteFolder,
    RemoteStore, StoreError, StoreResult,
};
use archiver_worker::{InboundEvent, Pipeline, TransportError};
use async_trait::async_trait;
use tempfile::TempDir;

pub const CHANNEL: &str = "120363000000000000@g.us";
pub const ROOT: &str = "Arquivo";

/// Writes a fake mp3 next to the source instead of running ffmpeg.
///
/// With `fail` set it leaves a truncated target behind and reports a
/// non-zero exit, like an ffmpeg run that dies halfway.
#[derive(Default)]
pub struct FakeTranscoder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeTranscoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, source: &Path, target: &Path) -> Result<(), TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            let _ = tokio::fs::write(target, b"ID3").await;
            return Err(TranscodeError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        let input = tokio::fs::read(source)
            .await
            .map_err(|e| TranscodeError::Failed {
                status: "io".to_string(),
                stderr: e.to_string(),
            })?;
        let mut output = b"ID3".to_vec();
        output.extend_from_slice(&input);
        tokio::fs::write(target, output)
            .await
            .map_err(|e| TranscodeError::Failed {
                status: "io".to_string(),
                stderr: e.to_string(),
            })
    }
}

/// In-memory store with injectable latency and failures.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub folder_creates: AtomicUsize,
    pub upload_attempts: AtomicUsize,
    pub grant_attempts: AtomicUsize,
    pub lookup_delay: Option<Duration>,
    pub fail_lookups: bool,
    pub fail_uploads: bool,
    pub rejected_identities: Vec<String>,
}

#[async_trait]
impl RemoteStore for FlakyStore {
    async fn list_folders(&self, name: &str, parent_id: &str) -> StoreResult<Vec<RemoteFolder>> {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_lookups {
            return Err(StoreError::Request("connection reset by peer".to_string()));
        }
        self.inner.list_folders(name, parent_id).await
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String> {
        self.folder_creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_folder(name, parent_id).await
    }

    async fn create_file(
        &self,
        metadata: FileMetadata,
        content: ContentReader,
    ) -> StoreResult<String> {
        self.upload_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads {
            return Err(StoreError::Api {
                status: 403,
                message: "The user's Drive storage quota has been exceeded.".to_string(),
            });
        }
        self.inner.create_file(metadata, content).await
    }

    async fn grant_access(
        &self,
        file_id: &str,
        identity: &str,
        role: AccessRole,
    ) -> StoreResult<()> {
        self.grant_attempts.fetch_add(1, Ordering::SeqCst);
        if self.rejected_identities.iter().any(|r| r == identity) {
            return Err(StoreError::Api {
                status: 400,
                message: format!("Invalid sharing request for {}", identity),
            });
        }
        self.inner.grant_access(file_id, identity, role).await
    }

    fn backend_type(&self) -> RemoteBackend {
        RemoteBackend::Memory
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub store: Arc<FlakyStore>,
    pub transcoder: Arc<FakeTranscoder>,
    pub pipeline: Arc<Pipeline>,
}

impl Harness {
    pub fn new(store: FlakyStore, allow_list: &[&str]) -> Self {
        Self::with_transcoder(store, FakeTranscoder::default(), allow_list)
    }

    pub fn with_transcoder(
        store: FlakyStore,
        transcoder: FakeTranscoder,
        allow_list: &[&str],
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let allow_list = allow_list.join(",");

        let mut config = Config::from_lookup(|key| match key {
            "MONITORED_CHANNEL_ID" => Some(CHANNEL.to_string()),
            "ROOT_FOLDER_NAME" => Some(ROOT.to_string()),
            "REMOTE_BACKEND" => Some("memory".to_string()),
            "ACCESS_ALLOW_LIST" => Some(allow_list.clone()),
            _ => None,
        })
        .unwrap();
        config.staging_dirs = StagingDirs::under(dir.path());

        let store = Arc::new(store);
        let transcoder = Arc::new(transcoder);
        let pipeline = Pipeline::new(&config, store.clone(), transcoder.clone())
            .with_ids(Arc::new(SequentialIds::starting_at(1)))
            .with_stager(LocalStager::without_sync());

        Self {
            dir,
            store,
            transcoder,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn staging(&self, sub: &str, file: &str) -> PathBuf {
        self.dir.path().join(sub).join(file)
    }

    /// Every regular file left under the staging base.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut pending = vec![self.dir.path().to_path_buf()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    found.push(path);
                }
            }
        }
        found
    }
}

pub fn attachment(media_type: &str, data: &'static [u8]) -> Attachment {
    Attachment::new(CHANNEL, media_type, data)
}

/// Event as a chat bridge would deliver it.
pub struct TestEvent {
    pub channel: String,
    pub attachment: Option<Attachment>,
    pub broken_download: bool,
}

impl TestEvent {
    pub fn with_attachment(attachment: Attachment) -> Self {
        Self {
            channel: attachment.channel_id.clone(),
            attachment: Some(attachment),
            broken_download: false,
        }
    }

    pub fn text_only(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            attachment: None,
            broken_download: false,
        }
    }
}

#[async_trait]
impl InboundEvent for TestEvent {
    fn channel_id(&self) -> &str {
        &self.channel
    }

    fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }

    async fn attachment(&self) -> Result<Attachment, TransportError> {
        if self.broken_download {
            return Err(TransportError::Download("media expired".to_string()));
        }
        self.attachment.clone().ok_or(TransportError::NoAttachment)
    }
}
