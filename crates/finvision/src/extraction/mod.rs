//! Extraction client: hands an encoded document to the external
//! classification service and returns structured fields.

pub mod client;
pub mod encode;
pub mod error;
pub mod gemini;
pub mod result;

pub use client::{ExtractionRequest, Extractor};
pub use encode::EncodedDocument;
pub use error::ExtractionError;
pub use gemini::GeminiExtractor;
pub use result::{ExtractionResult, LineItem};
