//! Inbound message transport seam
//!
//! The chat client itself lives outside this workspace. Anything that can
//! report a channel id and hand over an attachment can feed the pipeline.

use archiver_core::Attachment;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Event carries no attachment")]
    NoAttachment,

    #[error("Attachment download failed: {0}")]
    Download(String),

    #[error("Attachment payload could not be decoded: {0}")]
    Decode(String),
}

/// One message received from the transport.
#[async_trait]
pub trait InboundEvent: Send + Sync {
    /// Channel (chat) the message was posted in.
    fn channel_id(&self) -> &str;

    fn has_attachment(&self) -> bool;

    /// Text of the message, when the transport carries one.
    fn body(&self) -> Option<&str> {
        None
    }

    /// Fetch the attachment. May hit the network.
    async fn attachment(&self) -> Result<Attachment, TransportError>;
}
