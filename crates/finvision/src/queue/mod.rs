//! Sequential upload/extraction queue.

pub mod controller;
pub mod job;
pub mod policy;
pub mod sink;
pub mod store;

pub use controller::{QueueOptions, UploadQueue};
pub use job::{detect_mime_type, FileSource, JobStatus, QueueJob, UploadFile};
pub use policy::BatchPolicy;
pub use sink::{RecordSink, SinkError};
pub use store::{QueueSnapshot, QueueStore, TransitionError};

/// Shown on a job whose file could not be read, encoded or extracted.
pub const PROCESS_FAILED: &str = "Failed to process document";
/// Shown on a job whose records the sink refused.
pub const SAVE_FAILED: &str = "Failed to save document";
