use crate::state::PipelineState;
use crate::transport::TransportError;
use archiver_processing::TranscodeError;
use archiver_services::{RemoteFolderError, UploadError};
use archiver_storage::StagingError;
use thiserror::Error;

/// Fatal failure of one attachment's pipeline.
///
/// `failed_at` is the last state the attachment reached before the failing
/// step. Staged data is left in place.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Transport error: {source}")]
    Transport {
        #[source]
        source: TransportError,
    },

    #[error("Staging failed after {failed_at}: {source}")]
    Staging {
        failed_at: PipelineState,
        #[source]
        source: StagingError,
    },

    #[error("Transcoding failed after {failed_at}: {source}")]
    Transcode {
        failed_at: PipelineState,
        #[source]
        source: TranscodeError,
    },

    #[error("Remote folder resolution failed after {failed_at}: {source}")]
    RemoteFolder {
        failed_at: PipelineState,
        #[source]
        source: RemoteFolderError,
    },

    #[error("Upload failed after {failed_at}: {source}")]
    Upload {
        failed_at: PipelineState,
        #[source]
        source: UploadError,
    },
}

impl PipelineError {
    pub fn failed_at(&self) -> PipelineState {
        match self {
            PipelineError::Transport { .. } => PipelineState::Received,
            PipelineError::Staging { failed_at, .. }
            | PipelineError::Transcode { failed_at, .. }
            | PipelineError::RemoteFolder { failed_at, .. }
            | PipelineError::Upload { failed_at, .. } => *failed_at,
        }
    }

    /// Short machine-friendly name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Transport { .. } => "transport",
            PipelineError::Staging { .. } => "staging",
            PipelineError::Transcode { .. } => "transcode",
            PipelineError::RemoteFolder { .. } => "remote_folder",
            PipelineError::Upload { .. } => "upload",
        }
    }
}

impl From<TransportError> for PipelineError {
    fn from(source: TransportError) -> Self {
        PipelineError::Transport { source }
    }
}
