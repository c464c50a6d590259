use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Errors returned by queue commands. Pipeline failures never surface here;
/// they end the job in the `failed` state instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("Job '{0}' not found in queue")]
    JobNotFound(String),

    #[error("Job '{0}' is being processed and cannot be removed")]
    JobActive(String),

    #[error("Batch policy cannot change while a document is being processed")]
    Busy,

    #[error("Upload queue has been shut down")]
    ShutDown,
}
