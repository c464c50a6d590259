use thiserror::Error;

/// Reasons an extraction call can fail. The queue treats every variant the
/// same way; the distinction only matters for logs.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No API key configured for the extraction service")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Extraction request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Extraction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Extraction service returned no content")]
    EmptyResponse,

    #[error("Extraction output is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Extraction output is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Extraction service failed: {0}")]
    Service(String),

    #[error("Secret resolution failed: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}
