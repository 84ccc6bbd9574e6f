use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Remote store backend types
///
/// Defined in core because configuration selects it and the storage factory
/// consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteBackend {
    Drive,
    Memory,
}

impl FromStr for RemoteBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drive" | "gdrive" | "google-drive" => Ok(RemoteBackend::Drive),
            "memory" => Ok(RemoteBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid remote backend: {}", s)),
        }
    }
}

impl Display for RemoteBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RemoteBackend::Drive => write!(f, "drive"),
            RemoteBackend::Memory => write!(f, "memory"),
        }
    }
}
