//! Archiver Storage Library
//!
//! Local staging of attachment bytes and the remote store abstraction the
//! archive is mirrored into.
//!
//! # Remote layout
//!
//! Remote objects live in a folder tree rooted at [`REMOTE_ROOT_ID`]. Folders
//! are addressed by `(name, parent_id)`; nothing in a store enforces that pair
//! to be unique, so callers that care (the folder resolver) serialize their own
//! check-then-create sequences.
//!
//! [`REMOTE_ROOT_ID`]: archiver_core::constants::REMOTE_ROOT_ID

#[cfg(feature = "storage-drive")]
pub mod drive;
pub mod factory;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod stager;
pub mod traits;

// Re-export commonly used types
pub use archiver_core::RemoteBackend;
#[cfg(feature = "storage-drive")]
pub use drive::DriveStore;
pub use factory::create_remote_store;
#[cfg(feature = "storage-memory")]
pub use memory::{MemoryStore, StoredFile, StoredFolder};
pub use stager::{LocalStager, StagingError};
pub use traits::{ContentReader, FileMetadata, RemoteFolder, RemoteStore, StoreError, StoreResult};
