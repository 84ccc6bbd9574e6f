//! Read-access grants for uploaded files.
//!
//! Every allow-listed identity gets one `reader` grant per file. A failed grant
//! is logged and recorded; the remaining identities are still attempted and
//! the upload is never rolled back. Grants are not deduplicated: granting the
//! same identity twice is harmless on the remote side.

use archiver_core::{AccessGrant, AccessRole};
use archiver_storage::{RemoteStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to grant {role} access on {file_id} to {identity}: {source}")]
pub struct AccessGrantError {
    pub file_id: String,
    pub identity: String,
    pub role: AccessRole,
    #[source]
    pub source: StoreError,
}

/// Outcome of granting access to one file.
#[derive(Debug, Default)]
pub struct GrantReport {
    pub granted: Vec<AccessGrant>,
    pub failed: Vec<AccessGrantError>,
}

impl GrantReport {
    pub fn attempted(&self) -> usize {
        self.granted.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct AccessController {
    store: Arc<dyn RemoteStore>,
    allow_list: Vec<String>,
}

impl AccessController {
    /// Entries are trimmed; blank entries are dropped.
    pub fn new(store: Arc<dyn RemoteStore>, allow_list: impl IntoIterator<Item = String>) -> Self {
        let allow_list = allow_list
            .into_iter()
            .map(|identity| identity.trim().to_string())
            .filter(|identity| !identity.is_empty())
            .collect();
        Self { store, allow_list }
    }

    pub fn allow_list(&self) -> &[String] {
        &self.allow_list
    }

    pub fn is_enabled(&self) -> bool {
        !self.allow_list.is_empty()
    }

    #[tracing::instrument(skip(self))]
    pub async fn grant_all(&self, file_id: &str) -> GrantReport {
        let mut report = GrantReport::default();
        let role = AccessRole::Reader;

        for identity in &self.allow_list {
            match self.store.grant_access(file_id, identity, role).await {
                Ok(()) => {
                    tracing::info!(identity = %identity, "Access granted");
                    report.granted.push(AccessGrant {
                        remote_file_id: file_id.to_string(),
                        identity: identity.clone(),
                        role,
                    });
                }
                Err(source) => {
                    let err = AccessGrantError {
                        file_id: file_id.to_string(),
                        identity: identity.clone(),
                        role,
                        source,
                    };
                    tracing::warn!(identity = %identity, error = %err, "Access grant failed");
                    report.failed.push(err);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archiver_core::constants::REMOTE_ROOT_ID;
    use archiver_storage::{ContentReader, FileMetadata, MemoryStore, RemoteBackend, RemoteFolder, StoreResult};
    use async_trait::async_trait;
    use std::io::Cursor;

    /// Rejects grants for one identity.
    struct PickyStore {
        inner: MemoryStore,
        rejected: String,
    }

    #[async_trait]
    impl RemoteStore for PickyStore {
        async fn list_folders(&self, name: &str, parent_id: &str) -> StoreResult<Vec<RemoteFolder>> {
            self.inner.list_folders(name, parent_id).await
        }

        async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String> {
            self.inner.create_folder(name, parent_id).await
        }

        async fn create_file(
            &self,
            metadata: FileMetadata,
            content: ContentReader,
        ) -> StoreResult<String> {
            self.inner.create_file(metadata, content).await
        }

        async fn grant_access(
            &self,
            file_id: &str,
            identity: &str,
            role: AccessRole,
        ) -> StoreResult<()> {
            if identity == self.rejected {
                return Err(StoreError::Api {
                    status: 400,
                    message: "Invalid sharing request".to_string(),
                });
            }
            self.inner.grant_access(file_id, identity, role).await
        }

        fn backend_type(&self) -> RemoteBackend {
            RemoteBackend::Memory
        }
    }

    async fn uploaded_file(store: &dyn RemoteStore) -> String {
        store
            .create_file(
                FileMetadata {
                    name: "contact_1.vcf".to_string(),
                    parent_id: REMOTE_ROOT_ID.to_string(),
                    mime_type: "text/x-vcard".to_string(),
                    content_length: None,
                },
                Box::pin(Cursor::new(b"BEGIN:VCARD".to_vec())),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_failed_grant_does_not_block_the_rest() {
        let store = Arc::new(PickyStore {
            inner: MemoryStore::new(),
            rejected: "first@example.com".to_string(),
        });
        let file_id = uploaded_file(store.as_ref()).await;
        let controller = AccessController::new(
            store.clone(),
            vec!["first@example.com".to_string(), "second@example.com".to_string()],
        );

        let report = controller.grant_all(&file_id).await;

        assert_eq!(report.attempted(), 2);
        assert!(!report.is_complete());
        assert_eq!(report.failed[0].identity, "first@example.com");
        assert_eq!(report.granted.len(), 1);
        assert_eq!(report.granted[0].identity, "second@example.com");

        let grants = store.inner.grants().await;
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].role, AccessRole::Reader);
    }

    #[tokio::test]
    async fn test_empty_allow_list_issues_no_grants() {
        let store = Arc::new(MemoryStore::new());
        let file_id = uploaded_file(store.as_ref()).await;
        let controller = AccessController::new(store.clone(), vec![" ".to_string()]);

        assert!(!controller.is_enabled());
        let report = controller.grant_all(&file_id).await;
        assert_eq!(report.attempted(), 0);
        assert!(store.grants().await.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_grants_are_tolerated() {
        let store = Arc::new(MemoryStore::new());
        let file_id = uploaded_file(store.as_ref()).await;
        let controller = AccessController::new(store.clone(), vec![" a@example.com ".to_string()]);

        assert!(controller.grant_all(&file_id).await.is_complete());
        assert!(controller.grant_all(&file_id).await.is_complete());
        assert_eq!(store.grants().await.len(), 2);
        assert_eq!(controller.allow_list(), ["a@example.com"]);
    }
}
