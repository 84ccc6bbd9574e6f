//! Archiver Infrastructure Library
//!
//! Process-wide plumbing shared by archiver binaries. Today that is tracing
//! initialisation only.

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, TelemetryError, DEFAULT_LOG_FILTER};
