#[cfg(feature = "storage-drive")]
use crate::DriveStore;
#[cfg(feature = "storage-memory")]
use crate::MemoryStore;
use crate::{RemoteBackend, RemoteStore, StoreError, StoreResult};
use archiver_core::Config;
use std::sync::Arc;

/// Create a remote store based on configuration
pub fn create_remote_store(config: &Config) -> StoreResult<Arc<dyn RemoteStore>> {
    match config.remote_backend {
        #[cfg(feature = "storage-drive")]
        RemoteBackend::Drive => {
            let token = config.drive.access_token.clone().ok_or_else(|| {
                StoreError::Config("DRIVE_ACCESS_TOKEN not configured".to_string())
            })?;
            let store = DriveStore::new(
                token,
                config.drive.api_base_url.clone(),
                config.drive.upload_base_url.clone(),
            )?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-drive"))]
        RemoteBackend::Drive => Err(StoreError::Config(
            "Drive backend not available (storage-drive feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        RemoteBackend::Memory => {
            tracing::warn!("Using in-memory remote store; archived files are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }

        #[cfg(not(feature = "storage-memory"))]
        RemoteBackend::Memory => Err(StoreError::Config(
            "Memory backend not available (storage-memory feature not enabled)".to_string(),
        )),
    }
}
