//! FFmpeg transcoder - voice note to MP3

use crate::traits::{TranscodeError, Transcoder};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

pub struct FfmpegTranscoder {
    ffmpeg_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub(crate) fn mp3_args(source: &Path, target: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-f".to_string(),
            "mp3".to_string(),
            "-y".to_string(),
            target.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, source: &Path, target: &Path) -> Result<(), TranscodeError> {
        let output = Command::new(&self.ffmpeg_path)
            .args(Self::mp3_args(source, target))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                program: self.ffmpeg_path.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::Failed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(target).await.unwrap_or(false) {
            return Err(TranscodeError::MissingOutput {
                path: target.to_path_buf(),
            });
        }

        Ok(())
    }
}
