//! Archiver Media Processing Library
//!
//! Conversion of staged attachments before upload. Only voice notes are
//! processed today: they are transcoded from Opus to MP3 with FFmpeg.

pub mod traits;

#[cfg(feature = "audio")]
pub mod audio;

// Re-export commonly used types
pub use traits::{TranscodeError, Transcoder};

#[cfg(feature = "audio")]
pub use audio::{transcode_staged, FfmpegTranscoder};
