//! Queue event broadcaster for real-time job status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::queue::{BatchPolicy, JobStatus, QueueJob};

/// Progress event for a single job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    /// Unique job identifier.
    pub job_id: String,
    /// Original filename being processed.
    pub filename: String,
    pub status: JobStatus,
    /// 0-100.
    pub progress: u8,
    /// Short user-facing message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl JobProgressEvent {
    pub fn from_job(job: &QueueJob) -> Self {
        Self {
            job_id: job.id.clone(),
            filename: job.file.name.clone(),
            status: job.status,
            progress: job.progress,
            error: job.error.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Everything observers of the upload queue may want to react to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QueueEvent {
    JobSubmitted { job_id: String, filename: String },
    JobProgress(JobProgressEvent),
    JobRemoved { job_id: String },
    FinishedCleared { count: usize },
    PolicyChanged { policy: BatchPolicy },
    /// The queue went from having pending or active jobs to having none.
    Drained { completed: usize, failed: usize },
}

impl QueueEvent {
    /// Job the event refers to, if any.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            QueueEvent::JobSubmitted { job_id, .. } | QueueEvent::JobRemoved { job_id } => {
                Some(job_id)
            }
            QueueEvent::JobProgress(progress) => Some(&progress.job_id),
            _ => None,
        }
    }
}

/// Broadcasts queue events for streaming.
#[derive(Clone)]
pub struct QueueEventBroadcaster {
    sender: Arc<broadcast::Sender<QueueEvent>>,
}

impl QueueEventBroadcaster {
    /// Creates a new broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: QueueEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber for queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.sender.subscribe()
    }
}

impl Default for QueueEventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
