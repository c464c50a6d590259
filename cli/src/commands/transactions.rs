use anyhow::bail;
use finvision::ledger::{search, TransactionEdit};

use crate::state::AppState;

pub fn list(state: &AppState, term: Option<&str>, json: bool) -> anyhow::Result<()> {
    let all = state.store.list_transactions()?;
    let matches = search(&all, term.unwrap_or(""));

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No transactions found");
        return Ok(());
    }

    for t in matches {
        println!(
            "{}  {:<10}  {:<24}  {:<16}  {:<7}  {:>10.2} {}",
            t.id,
            t.date,
            t.vendor,
            t.category,
            t.kind.as_str(),
            t.amount,
            t.currency
        );
    }
    Ok(())
}

pub fn delete(state: &AppState, id: &str) -> anyhow::Result<()> {
    if !state.store.delete_transaction(id)? {
        bail!("Transaction '{}' not found", id);
    }
    println!("Deleted {}", id);
    Ok(())
}

/// Applies user corrections to a stored transaction.
pub fn edit(state: &AppState, id: &str, edit: TransactionEdit) -> anyhow::Result<()> {
    let Some(saved) = state.store.edit_transaction(id, &edit)? else {
        bail!("Transaction '{}' not found", id);
    };
    println!(
        "Updated {}: {} {} {} {:.2} {} ({})",
        saved.id,
        saved.date,
        saved.vendor,
        saved.kind,
        saved.amount,
        saved.currency,
        saved.category
    );
    Ok(())
}

/// Lists uploaded documents, newest first.
pub fn documents(state: &AppState, json: bool) -> anyhow::Result<()> {
    let documents = state.store.list_documents()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&documents)?);
        return Ok(());
    }

    if documents.is_empty() {
        println!("No documents uploaded");
        return Ok(());
    }

    for d in documents {
        println!(
            "{}  {:<32}  {:>8.0} KB  {:<9}  {}",
            d.id,
            d.name,
            d.file_size as f64 / 1024.0,
            d.status.as_str(),
            d.upload_date
        );
    }
    Ok(())
}
