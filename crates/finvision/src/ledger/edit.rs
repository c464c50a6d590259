//! User corrections to a stored transaction.

use chrono::NaiveDate;
use thiserror::Error;

use super::record::{Transaction, TransactionType};

#[derive(Error, Debug, PartialEq)]
pub enum EditError {
    #[error("No changes given")]
    NothingToChange,

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Amount must be a finite number")]
    InvalidAmount,
}

/// Fields a user may change after extraction. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionEdit {
    pub date: Option<String>,
    pub vendor: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub kind: Option<TransactionType>,
}

impl TransactionEdit {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.vendor.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.kind.is_none()
    }

    /// Checks every field before touching `transaction`, so a rejected edit
    /// leaves it unchanged.
    pub fn apply(&self, transaction: &mut Transaction) -> Result<(), EditError> {
        if self.is_empty() {
            return Err(EditError::NothingToChange);
        }

        let date = self.date.as_deref().map(str::trim);
        if let Some(date) = date {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| EditError::InvalidDate(date.to_string()))?;
        }
        let vendor = self.vendor.as_deref().map(str::trim);
        if vendor == Some("") {
            return Err(EditError::EmptyField("vendor"));
        }
        if self.amount.is_some_and(|a| !a.is_finite()) {
            return Err(EditError::InvalidAmount);
        }

        if let Some(date) = date {
            transaction.date = date.to_string();
        }
        if let Some(vendor) = vendor {
            transaction.vendor = vendor.to_string();
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(category) = &self.category {
            transaction.category = category.trim().to_string();
        }
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }
        Ok(())
    }
}
