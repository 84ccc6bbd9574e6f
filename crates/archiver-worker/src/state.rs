use std::fmt::{Display, Formatter, Result as FmtResult};

/// Where an attachment is in its pipeline.
///
/// `Transcoded` only occurs for audio; `AccessGranted` only when the
/// allow-list is non-empty. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Received,
    Classified,
    Staged,
    Transcoded,
    FolderResolved,
    Uploaded,
    AccessGranted,
    CleanedUp,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "received",
            PipelineState::Classified => "classified",
            PipelineState::Staged => "staged",
            PipelineState::Transcoded => "transcoded",
            PipelineState::FolderResolved => "folder_resolved",
            PipelineState::Uploaded => "uploaded",
            PipelineState::AccessGranted => "access_granted",
            PipelineState::CleanedUp => "cleaned_up",
            PipelineState::Failed => "failed",
        }
    }

    /// True once the file exists remotely, whatever happened afterwards.
    pub fn is_archived(&self) -> bool {
        matches!(
            self,
            PipelineState::Uploaded | PipelineState::AccessGranted | PipelineState::CleanedUp
        )
    }
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
