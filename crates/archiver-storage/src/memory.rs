use crate::traits::{ContentReader, FileMetadata, RemoteFolder, RemoteStore, StoreError, StoreResult};
use crate::RemoteBackend;
use archiver_core::constants::REMOTE_ROOT_ID;
use archiver_core::{AccessGrant, AccessRole};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFolder {
    pub id: String,
    pub name: String,
    pub parent_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    pub mime_type: String,
    pub content: Bytes,
}

#[derive(Debug, Default)]
struct MemoryState {
    folders: Vec<StoredFolder>,
    files: Vec<StoredFile>,
    grants: Vec<AccessGrant>,
}

/// In-process remote store
///
/// Behaves like a remote store that allows sibling folders with the same name,
/// so duplicate creation is observable. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn parent_exists(state: &MemoryState, parent_id: &str) -> bool {
        parent_id == REMOTE_ROOT_ID || state.folders.iter().any(|f| f.id == parent_id)
    }

    pub async fn folders(&self) -> Vec<StoredFolder> {
        self.state.read().await.folders.clone()
    }

    pub async fn files(&self) -> Vec<StoredFile> {
        self.state.read().await.files.clone()
    }

    pub async fn grants(&self) -> Vec<AccessGrant> {
        self.state.read().await.grants.clone()
    }

    /// Files stored directly under `parent_id`.
    pub async fn files_in(&self, parent_id: &str) -> Vec<StoredFile> {
        self.state
            .read()
            .await
            .files
            .iter()
            .filter(|f| f.parent_id == parent_id)
            .cloned()
            .collect()
    }

    /// Folder id reached by walking `segments` from the root, taking the first
    /// match at each level.
    pub async fn folder_id_at(&self, segments: &[&str]) -> Option<String> {
        let state = self.state.read().await;
        let mut parent = REMOTE_ROOT_ID.to_string();
        for segment in segments {
            let folder = state
                .folders
                .iter()
                .find(|f| f.name == *segment && f.parent_id == parent)?;
            parent = folder.id.clone();
        }
        Some(parent)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_folders(&self, name: &str, parent_id: &str) -> StoreResult<Vec<RemoteFolder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .iter()
            .filter(|f| f.name == name && f.parent_id == parent_id)
            .map(|f| RemoteFolder {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect())
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String> {
        let mut state = self.state.write().await;
        if !Self::parent_exists(&state, parent_id) {
            return Err(StoreError::NotFound(format!("parent folder {}", parent_id)));
        }

        let id = self.allocate_id("folder");
        state.folders.push(StoredFolder {
            id: id.clone(),
            name: name.to_string(),
            parent_id: parent_id.to_string(),
        });

        tracing::debug!(folder_id = %id, name = %name, parent_id = %parent_id, "Memory store folder created");
        Ok(id)
    }

    async fn create_file(
        &self,
        metadata: FileMetadata,
        mut content: ContentReader,
    ) -> StoreResult<String> {
        let mut buffer = Vec::with_capacity(metadata.content_length.unwrap_or(0) as usize);
        content.read_to_end(&mut buffer).await?;

        let mut state = self.state.write().await;
        if !Self::parent_exists(&state, &metadata.parent_id) {
            return Err(StoreError::NotFound(format!(
                "parent folder {}",
                metadata.parent_id
            )));
        }

        let id = self.allocate_id("file");
        state.files.push(StoredFile {
            id: id.clone(),
            name: metadata.name,
            parent_id: metadata.parent_id,
            mime_type: metadata.mime_type,
            content: Bytes::from(buffer),
        });

        Ok(id)
    }

    async fn grant_access(
        &self,
        file_id: &str,
        identity: &str,
        role: AccessRole,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.files.iter().any(|f| f.id == file_id) {
            return Err(StoreError::NotFound(format!("file {}", file_id)));
        }

        state.grants.push(AccessGrant {
            remote_file_id: file_id.to_string(),
            identity: identity.to_string(),
            role,
        });
        Ok(())
    }

    fn backend_type(&self) -> RemoteBackend {
        RemoteBackend::Memory
    }
}
