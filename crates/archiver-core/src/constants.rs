//! Constants shared across archiver crates.

/// Identifier of the remote store root; the parent of the first path segment.
pub const REMOTE_ROOT_ID: &str = "root";

/// Media type of the transcoded audio artifact.
pub const TRANSCODED_AUDIO_MIME: &str = "audio/mpeg";

/// Extension of raw voice notes before transcoding.
pub const RAW_AUDIO_EXTENSION: &str = "opus";

/// Media type that marks an image attachment as a sticker.
pub const STICKER_MIME: &str = "image/webp";

/// Media type of an electronic business card.
pub const VCARD_MIME: &str = "text/x-vcard";
