use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Failed to execute transcoder {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transcoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Transcoder produced no output at {}", .path.display())]
    MissingOutput { path: PathBuf },
}

/// Out-of-process media converter.
///
/// Implementations must either leave a complete file at `target` and return
/// `Ok`, or return an error. They never touch `source`.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, source: &Path, target: &Path) -> Result<(), TranscodeError>;
}
