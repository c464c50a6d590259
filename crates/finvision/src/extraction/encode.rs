use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A document encoded for transport: base64 payload plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub payload: String,
    pub mime_type: String,
}

impl EncodedDocument {
    pub fn encode(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            payload: STANDARD.encode(bytes),
            mime_type: mime_type.to_string(),
        }
    }

    /// Self-describing form kept with the transaction for later preview,
    /// e.g. `data:application/pdf;base64,JVBERi0...`.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.payload)
    }
}
