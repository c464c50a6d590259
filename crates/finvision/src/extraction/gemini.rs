//! Gemini `generateContent` client for document extraction.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{ExtractionRequest, Extractor};
use super::error::ExtractionError;
use super::result::ExtractionResult;
use crate::config::ExtractionConfig;
use crate::sanitize::redact_url_key;
use crate::secrets::resolve_secret_optional;

const SYSTEM_INSTRUCTION: &str = "You are a professional financial auditor for small businesses. \
Extract data from the document into structured JSON. \
Identify if it is INCOME (the user is the seller) or EXPENSE (the user is the buyer). \
Fields: date (YYYY-MM-DD), vendor, totalAmount, taxAmount, category, currency, type, items.";

/// Extractor backed by the Gemini generative language API.
pub struct GeminiExtractor {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl GeminiExtractor {
    /// Builds the client from config, resolving the API key from the
    /// configured sources. A missing key is only reported on first use.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let api_key = resolve_secret_optional(
            config.api_key.as_deref(),
            config.api_key_file.as_deref(),
            Some(config.api_key_env_var.as_str()),
        )?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ExtractionError::Client)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: SystemInstruction<'a>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "date": { "type": "STRING" },
            "vendor": { "type": "STRING" },
            "totalAmount": { "type": "NUMBER" },
            "taxAmount": { "type": "NUMBER" },
            "category": { "type": "STRING" },
            "currency": { "type": "STRING" },
            "type": { "type": "STRING" },
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "description": { "type": "STRING" },
                        "quantity": { "type": "NUMBER" },
                        "price": { "type": "NUMBER" }
                    }
                }
            }
        },
        "required": ["date", "vendor", "totalAmount", "category", "currency", "type"]
    })
}

fn build_request<'a>(request: &ExtractionRequest<'a>) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: request.mime_type,
                        data: request.payload,
                    },
                },
                Part::Text {
                    text: format!(
                        "Analyze document for business user \"{}\". Output JSON.",
                        request.user_name
                    ),
                },
            ],
        }],
        system_instruction: SystemInstruction {
            parts: vec![TextPart {
                text: SYSTEM_INSTRUCTION,
            }],
        },
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
        },
    }
}

/// Concatenates the text parts of the first candidate.
fn response_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<ExtractionResult, ExtractionError> {
        let api_key = self.api_key.as_ref().ok_or(ExtractionError::MissingApiKey)?;
        let url = self.url();

        log::debug!(
            "Requesting extraction from {} ({}, {} base64 chars)",
            redact_url_key(&url),
            request.mime_type,
            request.payload.len()
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&build_request(&request))
            .send()
            .await
            .map_err(ExtractionError::Request)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status { status, body });
        }

        let generated: GenerateResponse =
            response.json().await.map_err(ExtractionError::Request)?;

        let text = response_text(generated).ok_or(ExtractionError::EmptyResponse)?;
        ExtractionResult::from_json_text(&text)
    }
}
