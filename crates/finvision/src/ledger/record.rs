//! Durable record types emitted by the upload queue and kept by the store.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Whether a transaction brings money in or takes it out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// Processing status of an uploaded document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "PENDING",
            DocumentStatus::Processing => "PROCESSING",
            DocumentStatus::Completed => "COMPLETED",
            DocumentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(DocumentStatus::Pending),
            "PROCESSING" => Some(DocumentStatus::Processing),
            "COMPLETED" => Some(DocumentStatus::Completed),
            "FAILED" => Some(DocumentStatus::Failed),
            _ => None,
        }
    }
}

/// Provenance of an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    /// Original filename.
    pub name: String,
    /// RFC 3339 upload timestamp.
    pub upload_date: String,
    pub status: DocumentStatus,
    /// Size in bytes.
    pub file_size: u64,
}

impl DocumentRecord {
    /// Creates a completed document record stamped with the current time.
    pub fn completed(name: &str, file_size: u64) -> Self {
        Self {
            id: new_record_id("doc"),
            name: name.to_string(),
            upload_date: Utc::now().to_rfc3339(),
            status: DocumentStatus::Completed,
            file_size,
        }
    }
}

/// A single financial fact extracted from a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Transaction date as reported by the extraction service (YYYY-MM-DD).
    pub date: String,
    pub vendor: String,
    pub amount: f64,
    pub tax: f64,
    pub category: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub document_id: String,
    /// Data URL of the source document, kept for later preview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Generates a record identifier such as `tr-5f0c...`.
pub fn new_record_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
