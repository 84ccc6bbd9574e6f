use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use super::MediaCategory;

/// Root-relative sequence of remote folder names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteFolderPath(Vec<String>);

impl RemoteFolderPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for RemoteFolderPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "/{}", self.0.join("/"))
    }
}

/// Where an attachment goes, locally and remotely.
///
/// `staging_path` is where the raw bytes land. It only differs from
/// `local_path` when the category is transcoded before upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: MediaCategory,
    pub file_name: String,
    pub local_path: PathBuf,
    pub staging_path: PathBuf,
    pub remote_folder_path: RemoteFolderPath,
}

impl ClassificationResult {
    pub fn needs_transcode(&self) -> bool {
        self.staging_path != self.local_path
    }
}
