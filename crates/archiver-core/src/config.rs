//! Configuration module
//!
//! Environment-driven configuration for the archiver: monitored channel,
//! staging directories, remote store selection, access allow-list, transcoder
//! and ingest queue sizing.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::classifier::StagingDirs;
use crate::remote_backend::RemoteBackend;

const PIPELINE_MAX_CONCURRENT: usize = 4;
const PIPELINE_QUEUE_CAPACITY: usize = 64;
const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Google Drive connection settings.
#[derive(Clone)]
pub struct DriveConfig {
    pub access_token: Option<String>,
    pub api_base_url: String,
    pub upload_base_url: String,
}

impl std::fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("upload_base_url", &self.upload_base_url)
            .finish()
    }
}

/// Ingest queue sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pipelines allowed to run at the same time.
    pub max_concurrent: usize,
    /// Events buffered before submission applies backpressure.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: PIPELINE_MAX_CONCURRENT,
            queue_capacity: PIPELINE_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub monitored_channel_id: String,
    pub root_folder_name: String,
    pub staging_dirs: StagingDirs,
    pub access_allow_list: Vec<String>,
    pub remote_backend: RemoteBackend,
    pub drive: DriveConfig,
    pub ffmpeg_path: String,
    pub pipeline: PipelineConfig,
    pub environment: String,
    pub log_format: LogFormat,
}

/// Split a comma separated list, trimming entries and dropping empty ones.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let dir = |key: &str, default: &str| PathBuf::from(var_or(key, default));

        let monitored_channel_id = lookup("MONITORED_CHANNEL_ID")
            .ok_or_else(|| anyhow::anyhow!("MONITORED_CHANNEL_ID must be set"))?;
        let root_folder_name = lookup("ROOT_FOLDER_NAME")
            .ok_or_else(|| anyhow::anyhow!("ROOT_FOLDER_NAME must be set"))?;

        let staging_dirs = StagingDirs {
            audio: dir("LOCAL_AUDIO_DIR", "media/audio"),
            image: dir("LOCAL_IMAGE_DIR", "media/images"),
            video: dir("LOCAL_VIDEO_DIR", "media/videos"),
            contacts: dir("LOCAL_CONTACTS_DIR", "media/contacts"),
            stickers: dir("LOCAL_STICKERS_DIR", "media/stickers"),
            other: dir("LOCAL_OTHER_DIR", "media/other"),
        };

        let remote_backend = match lookup("REMOTE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => RemoteBackend::Drive,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::Pretty,
        };

        let config = Config {
            monitored_channel_id,
            root_folder_name,
            staging_dirs,
            access_allow_list: lookup("ACCESS_ALLOW_LIST")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
            remote_backend,
            drive: DriveConfig {
                access_token: lookup("DRIVE_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()),
                api_base_url: var_or("DRIVE_API_BASE_URL", DRIVE_API_BASE_URL),
                upload_base_url: var_or("DRIVE_UPLOAD_BASE_URL", DRIVE_UPLOAD_BASE_URL),
            },
            ffmpeg_path: var_or("FFMPEG_PATH", "ffmpeg"),
            pipeline: PipelineConfig {
                max_concurrent: var_or("PIPELINE_MAX_CONCURRENT", "")
                    .parse()
                    .unwrap_or(PIPELINE_MAX_CONCURRENT),
                queue_capacity: var_or("PIPELINE_QUEUE_CAPACITY", "")
                    .parse()
                    .unwrap_or(PIPELINE_QUEUE_CAPACITY),
            },
            environment: lookup("ENVIRONMENT")
                .or_else(|| lookup("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            log_format,
        };

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.monitored_channel_id.trim().is_empty() {
            return Err(anyhow::anyhow!("MONITORED_CHANNEL_ID cannot be empty"));
        }
        if self.root_folder_name.trim().is_empty() {
            return Err(anyhow::anyhow!("ROOT_FOLDER_NAME cannot be empty"));
        }
        if self.pipeline.max_concurrent == 0 {
            return Err(anyhow::anyhow!("PIPELINE_MAX_CONCURRENT must be at least 1"));
        }
        if self.pipeline.queue_capacity == 0 {
            return Err(anyhow::anyhow!("PIPELINE_QUEUE_CAPACITY must be at least 1"));
        }
        if self.remote_backend == RemoteBackend::Drive && self.drive.access_token.is_none() {
            return Err(anyhow::anyhow!(
                "DRIVE_ACCESS_TOKEN must be set when REMOTE_BACKEND is drive"
            ));
        }
        if self.is_production() && self.remote_backend == RemoteBackend::Memory {
            return Err(anyhow::anyhow!(
                "REMOTE_BACKEND=memory is not allowed in production"
            ));
        }
        Ok(())
    }
}
