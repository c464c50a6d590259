use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use finvision::ledger::{export_filename, search, write_csv};

use crate::state::AppState;

pub fn run(state: &AppState, out: Option<PathBuf>, term: Option<&str>) -> anyhow::Result<()> {
    let all = state.store.list_transactions()?;
    let matches = search(&all, term.unwrap_or(""));

    let path =
        out.unwrap_or_else(|| PathBuf::from(export_filename(chrono::Local::now().date_naive())));
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, matches.iter().copied())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Exported {} transactions to {}", matches.len(), path.display());
    Ok(())
}
