//! Transcoding of a staged voice note.

use crate::traits::{TranscodeError, Transcoder};
use archiver_core::constants::TRANSCODED_AUDIO_MIME;
use archiver_core::StagedFile;
use std::path::Path;

/// Convert `staged` into `target` and retire the original.
///
/// On failure the original stays on disk and any partial output is removed.
/// On success the original is deleted immediately; a failed delete is only
/// logged because the converted file is already complete.
#[tracing::instrument(skip_all, fields(source = %staged.path().display(), target = %target.display()))]
pub async fn transcode_staged(
    transcoder: &dyn Transcoder,
    staged: StagedFile,
    target: &Path,
) -> Result<StagedFile, TranscodeError> {
    let start = std::time::Instant::now();

    if let Err(e) = transcoder.transcode(staged.path(), target).await {
        if tokio::fs::try_exists(target).await.unwrap_or(false) {
            if let Err(rm) = tokio::fs::remove_file(target).await {
                tracing::warn!(error = %rm, "Failed to remove partial transcoder output");
            }
        }
        tracing::error!(error = %e, "Audio transcode failed; original kept");
        return Err(e);
    }

    let original = staged.into_path();
    match tokio::fs::remove_file(&original).await {
        Ok(()) => tracing::debug!(path = %original.display(), "Original audio removed"),
        Err(e) => tracing::warn!(
            path = %original.display(),
            error = %e,
            "Failed to remove original audio after transcode"
        ),
    }

    tracing::info!(
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Audio transcoded"
    );
    Ok(StagedFile::new(target, TRANSCODED_AUDIO_MIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::tempdir;

    struct CopyTranscoder;

    #[async_trait]
    impl Transcoder for CopyTranscoder {
        async fn transcode(&self, source: &Path, target: &Path) -> Result<(), TranscodeError> {
            tokio::fs::copy(source, target).await.map_err(|e| TranscodeError::Failed {
                status: "copy".to_string(),
                stderr: e.to_string(),
            })?;
            Ok(())
        }
    }

    struct BrokenTranscoder;

    #[async_trait]
    impl Transcoder for BrokenTranscoder {
        async fn transcode(&self, _source: &Path, target: &Path) -> Result<(), TranscodeError> {
            tokio::fs::write(target, b"half").await.ok();
            Err(TranscodeError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_success_removes_original() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("audio_1.opus");
        let target = dir.path().join("audio_1.mp3");
        tokio::fs::write(&source, b"opus").await.unwrap();

        let converted = transcode_staged(&CopyTranscoder, StagedFile::new(&source, "audio/ogg"), &target)
            .await
            .unwrap();

        assert_eq!(converted.path(), target.as_path());
        assert_eq!(converted.mime_type(), TRANSCODED_AUDIO_MIME);
        assert!(!source.exists());
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_failure_keeps_original_and_drops_partial_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("audio_2.opus");
        let target = dir.path().join("audio_2.mp3");
        tokio::fs::write(&source, b"opus").await.unwrap();

        let result =
            transcode_staged(&BrokenTranscoder, StagedFile::new(&source, "audio/ogg"), &target).await;

        assert!(matches!(result, Err(TranscodeError::Failed { .. })));
        assert!(source.exists());
        assert!(!target.exists());
    }
}
