//! Upload of staged files into a resolved remote folder.

use archiver_core::{StagedFile, UploadRecord};
use archiver_storage::{FileMetadata, RemoteStore, StoreError};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to open staged file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload of {file_name} failed: {source}")]
    Store {
        file_name: String,
        #[source]
        source: StoreError,
    },

    #[error("Remote store returned an empty id for {file_name}")]
    EmptyId { file_name: String },
}

/// Streams staged files to the remote store in a single attempt.
///
/// Never touches the local file: a failed upload leaves it where it was.
#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn RemoteStore>,
}

impl Uploader {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip_all, fields(file_name = %file_name, parent_id = %parent_id, path = %staged.path().display()))]
    pub async fn upload(
        &self,
        staged: &StagedFile,
        file_name: &str,
        parent_id: &str,
    ) -> Result<UploadRecord, UploadError> {
        let file = tokio::fs::File::open(staged.path())
            .await
            .map_err(|source| UploadError::Open {
                path: staged.path().to_path_buf(),
                source,
            })?;
        let content_length = file.metadata().await.ok().map(|m| m.len());

        let metadata = FileMetadata {
            name: file_name.to_string(),
            parent_id: parent_id.to_string(),
            mime_type: staged.mime_type().to_string(),
            content_length,
        };

        let remote_file_id = self
            .store
            .create_file(metadata, Box::pin(file))
            .await
            .map_err(|source| UploadError::Store {
                file_name: file_name.to_string(),
                source,
            })?;

        if remote_file_id.is_empty() {
            return Err(UploadError::EmptyId {
                file_name: file_name.to_string(),
            });
        }

        tracing::info!(file_id = %remote_file_id, size_bytes = ?content_length, "File uploaded");

        Ok(UploadRecord {
            remote_file_id,
            file_name: file_name.to_string(),
            mime_type: staged.mime_type().to_string(),
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archiver_core::constants::REMOTE_ROOT_ID;
    use archiver_storage::MemoryStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_upload_streams_file_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("video_1.mp4");
        tokio::fs::write(&path, b"moov").await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let folder = store.create_folder("Videos", REMOTE_ROOT_ID).await.unwrap();
        let uploader = Uploader::new(store.clone());

        let record = uploader
            .upload(&StagedFile::new(&path, "video/mp4"), "video_1.mp4", &folder)
            .await
            .unwrap();

        let files = store.files_in(&folder).await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, record.remote_file_id);
        assert_eq!(files[0].name, "video_1.mp4");
        assert_eq!(files[0].mime_type, "video/mp4");
        assert_eq!(&files[0].content[..], b"moov");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_missing_staged_file_is_open_error() {
        let dir = tempdir().unwrap();
        let uploader = Uploader::new(Arc::new(MemoryStore::new()));

        let result = uploader
            .upload(
                &StagedFile::new(dir.path().join("gone"), "application/octet-stream"),
                "gone",
                REMOTE_ROOT_ID,
            )
            .await;

        assert!(matches!(result, Err(UploadError::Open { .. })));
    }

    #[tokio::test]
    async fn test_store_rejection_keeps_local_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image_1.jpeg");
        tokio::fs::write(&path, b"jpeg").await.unwrap();
        let uploader = Uploader::new(Arc::new(MemoryStore::new()));

        let result = uploader
            .upload(&StagedFile::new(&path, "image/jpeg"), "image_1.jpeg", "no-such-folder")
            .await;

        assert!(matches!(result, Err(UploadError::Store { .. })));
        assert!(path.exists());
    }
}
