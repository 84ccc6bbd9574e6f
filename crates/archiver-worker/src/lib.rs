//! Archiver Worker
//!
//! Runs one pipeline per inbound attachment: classify, stage, transcode
//! (audio only), resolve the remote folder chain, upload, grant access and
//! clean up. Pipelines are fed through a bounded [`IngestQueue`] that caps how
//! many run at once and pushes back on the transport when it fills up.

pub mod error;
pub mod pipeline;
pub mod queue;
pub mod state;
pub mod transport;

pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineOutcome};
pub use queue::{IngestQueue, QueueClosed, QueueStats};
pub use state::PipelineState;
pub use transport::{InboundEvent, TransportError};
