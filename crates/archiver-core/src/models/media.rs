use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Content category assigned to an attachment by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Audio,
    Image,
    Sticker,
    Video,
    Contact,
    Other,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 6] = [
        MediaCategory::Audio,
        MediaCategory::Image,
        MediaCategory::Sticker,
        MediaCategory::Video,
        MediaCategory::Contact,
        MediaCategory::Other,
    ];

    /// Prefix of every file name produced for this category.
    pub fn file_tag(&self) -> &'static str {
        match self {
            MediaCategory::Audio => "audio",
            MediaCategory::Image => "image",
            MediaCategory::Sticker => "sticker",
            MediaCategory::Video => "video",
            MediaCategory::Contact => "contact",
            MediaCategory::Other => "file",
        }
    }

    /// Extension of the archived artifact, if any.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            MediaCategory::Audio => Some("mp3"),
            MediaCategory::Image => Some("jpeg"),
            MediaCategory::Sticker => Some("webp"),
            MediaCategory::Video => Some("mp4"),
            MediaCategory::Contact => Some("vcf"),
            MediaCategory::Other => None,
        }
    }

    /// Name of the remote folder directly under the archive root.
    pub fn remote_folder_name(&self) -> &'static str {
        match self {
            MediaCategory::Audio => "Audios",
            MediaCategory::Image => "Imagens",
            MediaCategory::Sticker => "Stickers",
            MediaCategory::Video => "Videos",
            MediaCategory::Contact => "Contatos",
            MediaCategory::Other => "Outros",
        }
    }

    pub fn needs_transcode(&self) -> bool {
        matches!(self, MediaCategory::Audio)
    }
}

impl Display for MediaCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            MediaCategory::Audio => "audio",
            MediaCategory::Image => "image",
            MediaCategory::Sticker => "sticker",
            MediaCategory::Video => "video",
            MediaCategory::Contact => "contact",
            MediaCategory::Other => "other",
        };
        f.write_str(name)
    }
}
