use crate::state::AppState;

/// Prints the effective config as JSON. The API key is never serialized.
pub fn show(state: &AppState) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&state.config)?);
    println!("record store: {}", state.store.mode());
    Ok(())
}
