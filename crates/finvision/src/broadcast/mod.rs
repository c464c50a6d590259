//! Broadcasting of queue events to any number of observers (CLI progress
//! rendering, tests, host integrations).

pub mod job_progress;

pub use job_progress::{JobProgressEvent, QueueEvent, QueueEventBroadcaster};
