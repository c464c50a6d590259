use finvision::ledger::{dashboard_stats, search, Transaction};

use crate::state::AppState;

/// Prints dashboard figures over the transactions matching `term`.
pub fn show(state: &AppState, term: Option<&str>) -> anyhow::Result<()> {
    let all = state.store.list_transactions()?;
    let matches: Vec<Transaction> = search(&all, term.unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();

    let stats = dashboard_stats(&matches);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
