//! Volatile record store used when the database is unavailable or disabled.
//! Contents are lost when the process exits.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::StoreError;
use crate::ledger::{DocumentRecord, Transaction};

#[derive(Debug, Default)]
struct Records {
    /// Newest first.
    documents: Vec<DocumentRecord>,
    /// Newest first.
    transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Records> {
        match self.records.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Memory store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Records> {
        match self.records.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Memory store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Stores both records, or neither if either id is taken.
    pub fn insert_pair(
        &self,
        document: &DocumentRecord,
        transaction: &Transaction,
    ) -> Result<(), StoreError> {
        let mut records = self.write();
        if records.documents.iter().any(|d| d.id == document.id) {
            return Err(StoreError::DuplicateId(document.id.clone()));
        }
        if records.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(StoreError::DuplicateId(transaction.id.clone()));
        }
        records.documents.insert(0, document.clone());
        records.transactions.insert(0, transaction.clone());
        Ok(())
    }

    pub fn upsert(&self, transaction: &Transaction) {
        let mut records = self.write();
        match records
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction.id)
        {
            Some(existing) => *existing = transaction.clone(),
            None => records.transactions.insert(0, transaction.clone()),
        }
    }

    pub fn get(&self, id: &str) -> Option<Transaction> {
        self.read().transactions.iter().find(|t| t.id == id).cloned()
    }

    /// All transactions, latest date first; ties keep newest-inserted first.
    pub fn transactions(&self) -> Vec<Transaction> {
        let mut list = self.read().transactions.clone();
        list.sort_by(|a, b| b.date.cmp(&a.date));
        list
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.read().documents.clone()
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut records = self.write();
        let before = records.transactions.len();
        records.transactions.retain(|t| t.id != id);
        records.transactions.len() != before
    }
}
