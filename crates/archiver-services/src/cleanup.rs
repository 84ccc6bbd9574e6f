//! Removal of staged files once they are archived.

use archiver_core::StagedFile;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to remove staged file {}: {source}", .path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Deletes staged files. Consumes the [`StagedFile`] so it cannot be reused.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cleanup;

impl Cleanup {
    /// A file that is already gone counts as removed.
    pub async fn remove(&self, staged: StagedFile) -> Result<(), CleanupError> {
        let path = staged.into_path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Staged file removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Staged file already gone");
                Ok(())
            }
            Err(source) => Err(CleanupError { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_remove_deletes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sticker_1.webp");
        tokio::fs::write(&path, b"riff").await.unwrap();

        Cleanup.remove(StagedFile::new(&path, "image/webp")).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        let result = Cleanup
            .remove(StagedFile::new(dir.path().join("never"), "image/webp"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_remove_directory_fails() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        tokio::fs::create_dir(&sub).await.unwrap();

        let result = Cleanup.remove(StagedFile::new(&sub, "image/webp")).await;
        assert!(result.is_err());
        assert!(sub.exists());
    }
}
