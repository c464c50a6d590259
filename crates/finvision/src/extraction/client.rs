use async_trait::async_trait;

use super::error::ExtractionError;
use super::result::ExtractionResult;

/// One extraction call: the encoded document and who is asking.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// Base64 payload without a data URL prefix.
    pub payload: &'a str,
    pub mime_type: &'a str,
    /// Display name of the acting user, used to decide which side of the
    /// transaction they are on.
    pub user_name: &'a str,
}

/// The external classification capability.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<ExtractionResult, ExtractionError>;
}
