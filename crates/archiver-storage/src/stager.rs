//! Local staging of attachment bytes.
//!
//! Bytes are written to a hidden sibling file and renamed onto the final path
//! once flushed, so the final path either does not exist or holds the whole
//! payload.

use archiver_core::StagedFile;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move staged file into place at {}: {source}", .path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes attachment payloads to local disk.
#[derive(Debug, Clone)]
pub struct LocalStager {
    sync: bool,
}

impl Default for LocalStager {
    fn default() -> Self {
        Self { sync: true }
    }
}

impl LocalStager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip `fsync` before the rename. Only sensible for throwaway directories.
    pub fn without_sync() -> Self {
        Self { sync: false }
    }

    /// Create `dir` and its parents. Succeeds if it already exists, including when
    /// another task creates it concurrently.
    pub async fn ensure_dir(&self, dir: &Path) -> Result<(), StagingError> {
        fs::create_dir_all(dir)
            .await
            .map_err(|source| StagingError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })
    }

    /// Create every directory in `dirs`.
    pub async fn ensure_directories(&self, dirs: &[&Path]) -> Result<(), StagingError> {
        for dir in dirs {
            self.ensure_dir(dir).await?;
            tracing::debug!(path = %dir.display(), "Staging directory ready");
        }
        Ok(())
    }

    /// Write `data` to `path` and return the staged file.
    #[tracing::instrument(skip_all, fields(path = %path.display(), size_bytes = data.len(), mime_type = %mime_type))]
    pub async fn stage(
        &self,
        data: &[u8],
        path: &Path,
        mime_type: &str,
    ) -> Result<StagedFile, StagingError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.ensure_dir(parent).await?;
        }

        let partial = partial_path(path).ok_or_else(|| StagingError::Write {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        })?;

        if let Err(source) = self.write_partial(&partial, data).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StagingError::Write {
                path: path.to_path_buf(),
                source,
            });
        }

        if let Err(source) = fs::rename(&partial, path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StagingError::Rename {
                path: path.to_path_buf(),
                source,
            });
        }

        tracing::debug!("Attachment staged");
        Ok(StagedFile::new(path, mime_type))
    }

    async fn write_partial(&self, partial: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(partial).await?;
        file.write_all(data).await?;
        file.flush().await?;
        if self.sync {
            file.sync_all().await?;
        }
        Ok(())
    }
}

fn partial_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(format!(".{}.partial", name)))
}
