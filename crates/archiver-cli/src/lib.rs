//! Archiver CLI support
//!
//! The chat client runs as a separate bridge process that prints one JSON
//! object per received message. [`JsonLineEvent`] turns those lines into
//! pipeline events.

pub mod bridge;

pub use bridge::{parse_event_line, JsonLineEvent};
