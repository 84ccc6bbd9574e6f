//! Remote store abstraction trait
//!
//! Every remote backend (Google Drive, in-memory) implements [`RemoteStore`].
//! The pipeline only ever talks to the store through this trait.

use archiver_core::{AccessRole, RemoteBackend};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Remote store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for remote store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// File content handed to [`RemoteStore::create_file`]; consumed until EOF.
pub type ContentReader = Pin<Box<dyn AsyncRead + Send + Sync + Unpin>>;

/// Folder as reported by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
}

/// Metadata sent along with an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub name: String,
    pub parent_id: String,
    pub mime_type: String,
    pub content_length: Option<u64>,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Folders named `name` directly under `parent_id`.
    async fn list_folders(&self, name: &str, parent_id: &str) -> StoreResult<Vec<RemoteFolder>>;

    /// Create a folder and return its id. Does not check for an existing one.
    async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String>;

    /// Upload a file in a single attempt and return its id.
    async fn create_file(&self, metadata: FileMetadata, content: ContentReader)
        -> StoreResult<String>;

    /// Grant `role` on `file_id` to `identity`.
    async fn grant_access(&self, file_id: &str, identity: &str, role: AccessRole)
        -> StoreResult<()>;

    fn backend_type(&self) -> RemoteBackend;
}
