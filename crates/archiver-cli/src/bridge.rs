use archiver_core::Attachment;
use archiver_worker::{InboundEvent, TransportError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// One message as printed by the chat bridge.
///
/// ```json
/// {"from": "1203...@g.us", "has_media": true, "body": "", "mimetype": "video/mp4", "data": "<base64>"}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct JsonLineEvent {
    pub from: String,
    #[serde(default, alias = "hasMedia")]
    pub has_media: bool,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub mimetype: Option<String>,
    /// Base64 payload. Absent when the bridge could not download the media.
    #[serde(default)]
    pub data: Option<String>,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_event_line(line: &str) -> Result<Option<JsonLineEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

#[async_trait]
impl InboundEvent for JsonLineEvent {
    fn channel_id(&self) -> &str {
        &self.from
    }

    fn has_attachment(&self) -> bool {
        self.has_media
    }

    fn body(&self) -> Option<&str> {
        Some(self.body.as_str()).filter(|b| !b.is_empty())
    }

    async fn attachment(&self) -> Result<Attachment, TransportError> {
        if !self.has_media {
            return Err(TransportError::NoAttachment);
        }

        let encoded = self
            .data
            .as_deref()
            .ok_or_else(|| TransportError::Download("bridge sent no media payload".to_string()))?;
        let data = STANDARD
            .decode(encoded.trim())
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        let media_type = self
            .mimetype
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_MEDIA_TYPE);
        // Ends up in a multipart part header.
        if media_type.chars().any(char::is_control) {
            return Err(TransportError::Decode(format!(
                "media type contains control characters: {:?}",
                media_type
            )));
        }

        Ok(Attachment::new(self.from.clone(), media_type, data))
    }
}
