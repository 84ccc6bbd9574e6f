//! Remote folder resolver
//!
//! Maps a [`RemoteFolderPath`] to the id of its last folder, creating missing
//! folders on the way. The process-wide cache is keyed by `(name, parent_id)`.
//! A miss takes an exclusive section for that key only, so concurrent
//! resolutions of the same segment issue one lookup/create sequence between
//! them while unrelated segments resolve in parallel.
//!
//! The cache is not a source of truth. It starts empty on every process start
//! and is refilled from the remote store, so two processes with cold caches can
//! still race and create sibling duplicates.

use archiver_core::constants::REMOTE_ROOT_ID;
use archiver_core::RemoteFolderPath;
use archiver_storage::{RemoteStore, StoreError};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum RemoteFolderError {
    #[error("Failed to look up folder '{name}' under {parent_id}: {source}")]
    Lookup {
        name: String,
        parent_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to create folder '{name}' under {parent_id}: {source}")]
    Create {
        name: String,
        parent_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Remote store returned an empty id for folder '{name}'")]
    EmptyId { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FolderKey {
    name: String,
    parent_id: String,
}

impl FolderKey {
    fn new(name: &str, parent_id: &str) -> Self {
        Self {
            name: name.to_string(),
            parent_id: parent_id.to_string(),
        }
    }
}

pub struct FolderResolver {
    store: Arc<dyn RemoteStore>,
    cache: DashMap<FolderKey, String>,
    sections: DashMap<FolderKey, Arc<Mutex<()>>>,
}

impl FolderResolver {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
            sections: DashMap::new(),
        }
    }

    /// Id of the last folder in `path`. An empty path resolves to the root.
    pub async fn resolve(&self, path: &RemoteFolderPath) -> Result<String, RemoteFolderError> {
        let chain = self.resolve_chain(path).await?;
        Ok(chain
            .last()
            .cloned()
            .unwrap_or_else(|| REMOTE_ROOT_ID.to_string()))
    }

    /// Ids of every folder in `path`, outermost first.
    #[tracing::instrument(skip_all, fields(path = %path))]
    pub async fn resolve_chain(
        &self,
        path: &RemoteFolderPath,
    ) -> Result<Vec<String>, RemoteFolderError> {
        let mut chain = Vec::with_capacity(path.len());
        let mut parent_id = REMOTE_ROOT_ID.to_string();

        for name in path.segments() {
            let id = self.resolve_segment(name, &parent_id).await?;
            chain.push(id.clone());
            parent_id = id;
        }

        Ok(chain)
    }

    /// Cached id for `name` under `parent_id`, if resolved before.
    pub fn cached(&self, name: &str, parent_id: &str) -> Option<String> {
        self.cache
            .get(&FolderKey::new(name, parent_id))
            .map(|entry| entry.value().clone())
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    async fn resolve_segment(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<String, RemoteFolderError> {
        if let Some(id) = self.cached(name, parent_id) {
            return Ok(id);
        }

        let key = FolderKey::new(name, parent_id);
        let section = {
            let entry = self
                .sections
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        let _guard = section.lock().await;

        // Whoever held the section before us may have filled the cache.
        if let Some(id) = self.cached(name, parent_id) {
            return Ok(id);
        }

        let existing = self
            .store
            .list_folders(name, parent_id)
            .await
            .map_err(|source| RemoteFolderError::Lookup {
                name: name.to_string(),
                parent_id: parent_id.to_string(),
                source,
            })?;

        let id = match existing.into_iter().find(|f| !f.id.is_empty()) {
            Some(folder) => {
                tracing::debug!(name = %name, parent_id = %parent_id, folder_id = %folder.id, "Found existing remote folder");
                folder.id
            }
            None => {
                let id = self
                    .store
                    .create_folder(name, parent_id)
                    .await
                    .map_err(|source| RemoteFolderError::Create {
                        name: name.to_string(),
                        parent_id: parent_id.to_string(),
                        source,
                    })?;
                if id.is_empty() {
                    return Err(RemoteFolderError::EmptyId {
                        name: name.to_string(),
                    });
                }
                tracing::info!(name = %name, parent_id = %parent_id, folder_id = %id, "Created remote folder");
                id
            }
        };

        self.cache.insert(key, id.clone());
        Ok(id)
    }
}
