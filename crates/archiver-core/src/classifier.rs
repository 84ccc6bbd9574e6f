//! Attachment classifier
//!
//! Maps a declared media type to a category, file name, local staging
//! location and remote folder path. Pure: no I/O, no clock, no randomness.
//! The caller supplies the unique identifier.

use std::path::{Path, PathBuf};

use crate::constants::{RAW_AUDIO_EXTENSION, STICKER_MIME, VCARD_MIME};
use crate::models::{ClassificationResult, MediaCategory, RemoteFolderPath};

/// Local staging directory per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDirs {
    pub audio: PathBuf,
    pub image: PathBuf,
    pub video: PathBuf,
    pub contacts: PathBuf,
    pub stickers: PathBuf,
    pub other: PathBuf,
}

impl StagingDirs {
    /// All six directories under one base, named like the defaults.
    pub fn under(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            audio: base.join("audio"),
            image: base.join("images"),
            video: base.join("videos"),
            contacts: base.join("contacts"),
            stickers: base.join("stickers"),
            other: base.join("other"),
        }
    }

    pub fn for_category(&self, category: MediaCategory) -> &Path {
        match category {
            MediaCategory::Audio => &self.audio,
            MediaCategory::Image => &self.image,
            MediaCategory::Sticker => &self.stickers,
            MediaCategory::Video => &self.video,
            MediaCategory::Contact => &self.contacts,
            MediaCategory::Other => &self.other,
        }
    }

    pub fn all(&self) -> Vec<&Path> {
        MediaCategory::ALL
            .iter()
            .map(|c| self.for_category(*c))
            .collect()
    }
}

/// Category for a declared media type. Rules are checked in priority order.
pub fn categorize(media_type: &str) -> MediaCategory {
    let media_type = media_type.trim().to_ascii_lowercase();

    if media_type.starts_with("audio/ogg") || media_type == "audio/opus" {
        MediaCategory::Audio
    } else if media_type.starts_with("image") {
        if media_type == STICKER_MIME {
            MediaCategory::Sticker
        } else {
            MediaCategory::Image
        }
    } else if media_type.starts_with("video") {
        MediaCategory::Video
    } else if media_type == VCARD_MIME {
        MediaCategory::Contact
    } else {
        MediaCategory::Other
    }
}

fn file_name_for(category: MediaCategory, id: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}_{}.{}", category.file_tag(), id, ext),
        None => format!("{}_{}", category.file_tag(), id),
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    dirs: StagingDirs,
    root_folder: String,
}

impl Classifier {
    pub fn new(dirs: StagingDirs, root_folder: impl Into<String>) -> Self {
        Self {
            dirs,
            root_folder: root_folder.into(),
        }
    }

    pub fn staging_dirs(&self) -> &StagingDirs {
        &self.dirs
    }

    pub fn root_folder(&self) -> &str {
        &self.root_folder
    }

    pub fn classify(&self, media_type: &str, id: &str) -> ClassificationResult {
        let category = categorize(media_type);
        let dir = self.dirs.for_category(category);

        let file_name = file_name_for(category, id, category.extension());
        let local_path = dir.join(&file_name);
        let staging_path = if category.needs_transcode() {
            dir.join(file_name_for(category, id, Some(RAW_AUDIO_EXTENSION)))
        } else {
            local_path.clone()
        };

        ClassificationResult {
            category,
            file_name,
            local_path,
            staging_path,
            remote_folder_path: RemoteFolderPath::new([
                self.root_folder.as_str(),
                category.remote_folder_name(),
            ]),
        }
    }
}
