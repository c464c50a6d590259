//! Wiring shared by the commands: effective config and the record store.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use finvision::{load_config_or_default, Config, StoreMode, TransactionStore};
use log::warn;

pub struct AppState {
    pub config: Config,
    pub store: Arc<TransactionStore>,
}

impl AppState {
    pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
        load_config_or_default(path).context("Failed to load configuration")
    }

    /// Opens the record store for `config`. Never fails: an unusable
    /// database falls back to the in-memory store.
    pub fn open(config: Config) -> Self {
        let store = TransactionStore::open(&config);
        if store.mode() == StoreMode::Memory && !config.in_memory {
            warn!("Running without a database; records will be lost on exit");
        }

        Self {
            config,
            store: Arc::new(store),
        }
    }
}
