//! Inline previews of the selected image.

use base64::Engine;
use mia_core::{ImageFile, RequestId};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    #[error("{0} is empty")]
    Empty(String),

    #[error("no preview for {mime} files")]
    NotAnImage { mime: String },
}

/// A `data:` URL rendering of an image.
#[derive(Clone, PartialEq, Eq)]
pub struct Preview {
    pub mime: String,
    pub data_url: String,
}

impl Preview {
    pub fn decode(file: &ImageFile) -> Result<Self, PreviewError> {
        if file.bytes.is_empty() {
            return Err(PreviewError::Empty(file.name.clone()));
        }
        if !file.mime.starts_with("image/") {
            return Err(PreviewError::NotAnImage {
                mime: file.mime.clone(),
            });
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
        Ok(Self {
            mime: file.mime.clone(),
            data_url: format!("data:{};base64,{}", file.mime, encoded),
        })
    }
}

impl std::fmt::Debug for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preview")
            .field("mime", &self.mime)
            .field("len", &self.data_url.len())
            .finish()
    }
}

/// Handed out by a file selection. The preview it yields is only applied
/// while its request is still the current one.
#[derive(Debug, Clone)]
pub struct PreviewTicket {
    pub request_id: RequestId,
    pub file: ImageFile,
}

/// Decode a ticket's preview on the blocking pool. Failures yield `None`;
/// the workflow continues without a preview.
pub async fn decode_preview(ticket: PreviewTicket) -> (PreviewTicket, Option<Preview>) {
    let file = ticket.file.clone();
    let decoded = tokio::task::spawn_blocking(move || Preview::decode(&file)).await;

    let preview = match decoded {
        Ok(Ok(preview)) => Some(preview),
        Ok(Err(e)) => {
            debug!(request = %ticket.request_id, reason = %e, "Preview unavailable");
            None
        }
        Err(e) => {
            warn!(request = %ticket.request_id, error = %e, "Preview task failed");
            None
        }
    };
    (ticket, preview)
}
