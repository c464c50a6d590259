pub mod broadcast;
pub mod config;
pub mod db;
pub mod error;
pub mod extraction;
pub mod ledger;
pub mod logging;
pub mod presentation;
pub mod queue;
pub mod sanitize;
pub mod secrets;
pub mod storage;

pub use broadcast::{JobProgressEvent, QueueEvent, QueueEventBroadcaster};
pub use config::{load_config, load_config_or_default, Config};
pub use error::{ConfigError, QueueError};
pub use extraction::{ExtractionError, ExtractionResult, Extractor, GeminiExtractor};
pub use ledger::{DocumentRecord, Transaction, TransactionType};
pub use logging::{init_tracing, LogFormat, LoggingOptions};
pub use presentation::QueueView;
pub use queue::{BatchPolicy, JobStatus, QueueOptions, RecordSink, UploadFile, UploadQueue};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use storage::{StoreMode, TransactionStore};
