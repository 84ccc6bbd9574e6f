use bytes::Bytes;

/// Binary payload carried by an inbound channel message.
///
/// Immutable once received; the pipeline only ever reads it.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub channel_id: String,
    pub media_type: String,
    pub data: Bytes,
}

impl Attachment {
    pub fn new(
        channel_id: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
