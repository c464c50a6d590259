use async_trait::async_trait;
use thiserror::Error;

use crate::ledger::{DocumentRecord, Transaction};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Record rejected: {0}")]
    Rejected(String),

    #[error("Record store failed: {0}")]
    Store(#[from] crate::storage::StoreError),
}

/// Host-side destination for the records produced by the queue.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Takes ownership of one finished record pair. An error fails the job.
    async fn accept(
        &self,
        document: DocumentRecord,
        transaction: Transaction,
    ) -> Result<(), SinkError>;

    /// Called once each time the queue runs out of pending and active jobs.
    async fn batch_drained(&self) {}
}
