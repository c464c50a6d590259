use super::record::Transaction;

/// Returns the transactions whose vendor or category contains `term`,
/// ignoring case. An empty term matches everything.
pub fn search<'a>(transactions: &'a [Transaction], term: &str) -> Vec<&'a Transaction> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return transactions.iter().collect();
    }

    transactions
        .iter()
        .filter(|t| {
            t.vendor.to_lowercase().contains(&term) || t.category.to_lowercase().contains(&term)
        })
        .collect()
}
