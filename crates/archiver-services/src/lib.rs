//! Archiver Services Library
//!
//! The remote half of the pipeline: resolving the folder chain an attachment
//! belongs in, uploading into it, granting read access to the allow-list and
//! removing the local copy afterwards.

pub mod access;
pub mod cleanup;
pub mod resolver;
pub mod upload;

// Re-export commonly used types
pub use access::{AccessController, AccessGrantError, GrantReport};
pub use cleanup::{Cleanup, CleanupError};
pub use resolver::{FolderResolver, RemoteFolderError};
pub use upload::{UploadError, Uploader};
