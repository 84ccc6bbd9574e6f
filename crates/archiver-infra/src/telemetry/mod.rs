//! Tracing initialisation
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a single
//! `fmt` layer, rendered as pretty text or JSON lines.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, TelemetryError, DEFAULT_LOG_FILTER};
