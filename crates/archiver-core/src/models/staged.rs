use std::path::{Path, PathBuf};

/// A file on local disk owned by exactly one pipeline.
///
/// Not `Clone`: ownership moves from the stager to the transcoder (which
/// retires it and hands back a new one) and finally to cleanup.
#[derive(Debug, PartialEq, Eq)]
pub struct StagedFile {
    path: PathBuf,
    mime_type: String,
}

impl StagedFile {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
