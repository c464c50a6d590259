//! Transaction ledger: record types plus the read-side helpers used by the
//! host (search, edits, CSV export, dashboard figures).

pub mod edit;
pub mod export;
pub mod filter;
pub mod record;
pub mod stats;

pub use edit::{EditError, TransactionEdit};
pub use export::{export_filename, to_csv, write_csv};
pub use filter::search;
pub use record::{new_record_id, DocumentRecord, DocumentStatus, Transaction, TransactionType};
pub use stats::{dashboard_stats, DashboardStats, StatChange};
