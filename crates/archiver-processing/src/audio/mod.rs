//! Audio transcoding

pub mod ffmpeg;
pub mod staged;

pub use ffmpeg::FfmpegTranscoder;
pub use staged::transcode_staged;
