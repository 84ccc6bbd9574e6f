//! Archiver Core Library
//!
//! This crate provides the domain models, the attachment classifier, identifier
//! generation and configuration shared by every archiver component.

pub mod classifier;
pub mod config;
pub mod constants;
pub mod ids;
pub mod models;
pub mod remote_backend;

// Re-export commonly used types
pub use classifier::{categorize, Classifier, StagingDirs};
pub use config::{Config, DriveConfig, LogFormat, PipelineConfig};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use models::{
    AccessGrant, AccessRole, Attachment, ClassificationResult, MediaCategory, RemoteFolderPath,
    StagedFile, UploadRecord,
};
pub use remote_backend::RemoteBackend;
