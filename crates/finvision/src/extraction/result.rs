use serde::{Deserialize, Serialize};

use super::error::ExtractionError;

/// Fields the service must return for an extraction to be usable.
pub const REQUIRED_FIELDS: [&str; 5] = ["date", "vendor", "totalAmount", "category", "currency"];

/// Structured fields extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Transaction date, normally `YYYY-MM-DD`.
    pub date: String,
    pub vendor: String,
    pub total_amount: f64,
    #[serde(default)]
    pub tax_amount: Option<f64>,
    pub category: String,
    pub currency: String,
    /// Raw income/expense label as inferred by the service.
    #[serde(default, rename = "type")]
    pub inferred_type: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// One line of a receipt. The service may omit any of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ExtractionResult {
    /// Parses the JSON text produced by the service. Empty text, non-JSON
    /// output and missing or null required fields are all errors.
    pub fn from_json_text(text: &str) -> Result<Self, ExtractionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyResponse);
        }

        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ExtractionError::Service(
                "extraction output is not a JSON object".to_string(),
            ));
        }

        for field in REQUIRED_FIELDS {
            if value.get(field).map_or(true, |v| v.is_null()) {
                return Err(ExtractionError::MissingField(field));
            }
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Tax amount, zero when the service did not report one.
    pub fn tax(&self) -> f64 {
        self.tax_amount.unwrap_or(0.0)
    }
}
