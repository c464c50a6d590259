use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ledger::TransactionType;

/// The only inferred label that counts as income.
const INCOME_LABEL: &str = "income";

/// How processed documents are classified as income or expense.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatchPolicy {
    /// Force every transaction to income.
    Income,
    /// Force every transaction to expense.
    Expense,
    /// Use the type inferred by the extraction service.
    #[default]
    Auto,
}

impl BatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPolicy::Income => "income",
            BatchPolicy::Expense => "expense",
            BatchPolicy::Auto => "auto",
        }
    }

    /// Label shown on the policy selector.
    pub fn label(&self) -> &'static str {
        match self {
            BatchPolicy::Income => "Income",
            BatchPolicy::Expense => "Expenses",
            BatchPolicy::Auto => "AI Decide",
        }
    }

    /// Resolves the transaction type for one extraction. Under `Auto` only an
    /// exact `"income"` label yields income; anything else, including a
    /// missing label, is an expense.
    pub fn resolve(&self, inferred: Option<&str>) -> TransactionType {
        match self {
            BatchPolicy::Income => TransactionType::Income,
            BatchPolicy::Expense => TransactionType::Expense,
            BatchPolicy::Auto => match inferred {
                Some(INCOME_LABEL) => TransactionType::Income,
                _ => TransactionType::Expense,
            },
        }
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(BatchPolicy::Income),
            "expense" | "expenses" => Ok(BatchPolicy::Expense),
            "auto" => Ok(BatchPolicy::Auto),
            other => Err(format!(
                "unknown batch policy '{}' (expected income, expense or auto)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_uses_inferred_income() {
        assert_eq!(
            BatchPolicy::Auto.resolve(Some("income")),
            TransactionType::Income
        );
    }

    #[test]
    fn test_auto_defaults_to_expense() {
        for inferred in [None, Some("expense"), Some("INCOME"), Some("Income"), Some(""), Some("refund")] {
            assert_eq!(
                BatchPolicy::Auto.resolve(inferred),
                TransactionType::Expense,
                "inferred {:?}",
                inferred
            );
        }
    }

    #[test]
    fn test_explicit_policy_overrides_inference() {
        assert_eq!(
            BatchPolicy::Income.resolve(Some("expense")),
            TransactionType::Income
        );
        assert_eq!(BatchPolicy::Income.resolve(None), TransactionType::Income);
        assert_eq!(
            BatchPolicy::Expense.resolve(Some("income")),
            TransactionType::Expense
        );
    }

    #[test]
    fn test_parse_and_default() {
        assert_eq!(BatchPolicy::default(), BatchPolicy::Auto);
        assert_eq!("Income".parse::<BatchPolicy>(), Ok(BatchPolicy::Income));
        assert_eq!("expenses".parse::<BatchPolicy>(), Ok(BatchPolicy::Expense));
        assert!("maybe".parse::<BatchPolicy>().is_err());
        assert_eq!(BatchPolicy::Auto.label(), "AI Decide");
    }
}
