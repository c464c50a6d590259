use serde::Serialize;

use crate::queue::{BatchPolicy, JobStatus, QueueJob, QueueSnapshot};

/// Colour family for a job's status badge.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Neutral,
    Working,
    Success,
    Danger,
}

impl BadgeTone {
    pub fn for_status(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => BadgeTone::Neutral,
            JobStatus::Analyzing | JobStatus::Saving => BadgeTone::Working,
            JobStatus::Completed => BadgeTone::Success,
            JobStatus::Failed => BadgeTone::Danger,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueRow {
    pub id: String,
    pub file_name: String,
    /// Upper-cased status, e.g. `ANALYZING`.
    pub status_label: String,
    pub badge: BadgeTone,
    pub progress: u8,
    /// Size rendered as whole kilobytes, e.g. `12 KB`.
    pub size_kb: String,
    pub error: Option<String>,
    /// Whether the row offers a dismiss action. False only for the active job.
    pub removable: bool,
}

impl QueueRow {
    fn from_job(job: &QueueJob) -> Self {
        Self {
            id: job.id.clone(),
            file_name: job.file.name.clone(),
            status_label: job.status.as_str().to_ascii_uppercase(),
            badge: BadgeTone::for_status(job.status),
            progress: job.progress,
            size_kb: format!("{:.0} KB", job.file.size as f64 / 1024.0),
            error: job.error.clone(),
            removable: !job.status.is_active(),
        }
    }
}

/// Everything a renderer needs to draw the queue panel.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub rows: Vec<QueueRow>,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Pending plus in-flight jobs.
    pub remaining: usize,
    pub batch_complete: bool,
    /// Share of jobs that completed successfully, 0-100.
    pub percent: u8,
    pub header: String,
    pub can_submit: bool,
    pub can_change_policy: bool,
    pub policy: BatchPolicy,
    pub policy_label: &'static str,
}

impl QueueView {
    pub fn from_snapshot(snapshot: &QueueSnapshot) -> Self {
        let rows: Vec<QueueRow> = snapshot.jobs.iter().map(QueueRow::from_job).collect();

        let total = rows.len();
        let completed = snapshot.count(JobStatus::Completed);
        let failed = snapshot.count(JobStatus::Failed);
        let remaining = total - completed - failed;
        let batch_complete = total > 0 && remaining == 0;
        let percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        let header = if batch_complete {
            "Batch Complete".to_string()
        } else {
            format!("{} Remaining", remaining)
        };
        let busy = snapshot.is_busy();

        Self {
            rows,
            total,
            completed,
            failed,
            remaining,
            batch_complete,
            percent,
            header,
            can_submit: !busy,
            can_change_policy: !busy,
            policy: snapshot.policy,
            policy_label: snapshot.policy.label(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
