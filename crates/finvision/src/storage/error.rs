//! Record store error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),

    /// A record with the same id already exists.
    #[error("Record '{0}' already exists")]
    DuplicateId(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(#[from] crate::ledger::EditError),
}
