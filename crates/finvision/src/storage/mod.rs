//! Record persistence for processed documents.
//!
//! A durable SQLite store when the database opens, otherwise an in-memory
//! fallback. Either way the store is the queue's [`RecordSink`].

use std::fmt;

use async_trait::async_trait;
use log::{info, warn};

use crate::config::Config;
use crate::db::{document_repo, transaction_repo, Database};
use crate::ledger::{DocumentRecord, Transaction, TransactionEdit};
use crate::queue::{RecordSink, SinkError};

pub mod error;
pub mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Durable,
    Memory,
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Durable => f.write_str("durable"),
            StoreMode::Memory => f.write_str("memory"),
        }
    }
}

pub enum TransactionStore {
    Durable(Database),
    Memory(MemoryStore),
}

impl TransactionStore {
    /// Opens the configured database, falling back to memory when it is
    /// disabled or cannot be opened.
    pub fn open(config: &Config) -> Self {
        if config.in_memory {
            info!("Using in-memory record store");
            return Self::memory();
        }

        let Some(path) = config.resolved_database_path() else {
            warn!("No database path available, records will not survive restart");
            return Self::memory();
        };

        match Database::open(&path) {
            Ok(db) => {
                info!(
                    "Using durable record store at {}",
                    crate::sanitize::redact_path(&path)
                );
                TransactionStore::Durable(db)
            }
            Err(e) => {
                warn!(
                    "Could not open database ({}), records will not survive restart",
                    e
                );
                Self::memory()
            }
        }
    }

    pub fn memory() -> Self {
        TransactionStore::Memory(MemoryStore::new())
    }

    pub fn in_memory_database() -> Result<Self, StoreError> {
        Ok(TransactionStore::Durable(Database::open_in_memory()?))
    }

    pub fn mode(&self) -> StoreMode {
        match self {
            TransactionStore::Durable(_) => StoreMode::Durable,
            TransactionStore::Memory(_) => StoreMode::Memory,
        }
    }

    /// Saves a document and its transaction together.
    pub fn save_record_pair(
        &self,
        document: &DocumentRecord,
        transaction: &Transaction,
    ) -> Result<(), StoreError> {
        match self {
            TransactionStore::Durable(db) => {
                transaction_repo::insert_pair(db, document, transaction)?;
                Ok(())
            }
            TransactionStore::Memory(mem) => mem.insert_pair(document, transaction),
        }
    }

    /// Creates or fully replaces a transaction.
    pub fn upsert_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        match self {
            TransactionStore::Durable(db) => transaction_repo::upsert(db, transaction)?,
            TransactionStore::Memory(mem) => mem.upsert(transaction),
        }
        Ok(())
    }

    /// Transactions, latest date first.
    pub fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        match self {
            TransactionStore::Durable(db) => Ok(transaction_repo::list(db)?),
            TransactionStore::Memory(mem) => Ok(mem.transactions()),
        }
    }

    pub fn get_transaction(&self, id: &str) -> Result<Option<Transaction>, StoreError> {
        match self {
            TransactionStore::Durable(db) => Ok(transaction_repo::find_by_id(db, id)?),
            TransactionStore::Memory(mem) => Ok(mem.get(id)),
        }
    }

    /// Applies a user edit to a stored transaction and returns the saved
    /// result, or `None` when no transaction has that id.
    pub fn edit_transaction(
        &self,
        id: &str,
        edit: &TransactionEdit,
    ) -> Result<Option<Transaction>, StoreError> {
        let Some(mut transaction) = self.get_transaction(id)? else {
            return Ok(None);
        };
        edit.apply(&mut transaction)?;
        self.upsert_transaction(&transaction)?;
        info!("Updated transaction {}", transaction.id);
        Ok(Some(transaction))
    }

    /// Returns whether a transaction was deleted.
    pub fn delete_transaction(&self, id: &str) -> Result<bool, StoreError> {
        match self {
            TransactionStore::Durable(db) => Ok(transaction_repo::delete(db, id)?),
            TransactionStore::Memory(mem) => Ok(mem.delete(id)),
        }
    }

    /// Documents, newest upload first.
    pub fn list_documents(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        match self {
            TransactionStore::Durable(db) => Ok(document_repo::list(db)?),
            TransactionStore::Memory(mem) => Ok(mem.documents()),
        }
    }
}

#[async_trait]
impl RecordSink for TransactionStore {
    async fn accept(
        &self,
        document: DocumentRecord,
        transaction: Transaction,
    ) -> Result<(), SinkError> {
        self.save_record_pair(&document, &transaction)?;
        log::debug!(
            "Stored transaction {} for document {}",
            transaction.id,
            document.id
        );
        Ok(())
    }

    async fn batch_drained(&self) {
        match self.list_transactions() {
            Ok(all) => info!("Batch stored, {} transactions in {} store", all.len(), self.mode()),
            Err(e) => warn!("Could not reload transactions after batch: {}", e),
        }
    }
}
