//! In-session job collection. Enforces lifecycle ordering, FIFO selection
//! and the single-active-job rule; the controller is its only writer.

use thiserror::Error;

use super::job::{JobStatus, QueueJob, UploadFile};
use super::policy::BatchPolicy;
use crate::error::QueueError;

/// A rejected status change. Indicates a controller bug, never user input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Job '{0}' is not in the queue")]
    UnknownJob(String),

    #[error("Job '{id}' cannot move from {from} to {to}")]
    Illegal {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Job '{id}' cannot start while '{active}' is active")]
    AnotherActive { id: String, active: String },
}

/// Point-in-time copy of the queue for observers.
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    pub jobs: Vec<QueueJob>,
    pub policy: BatchPolicy,
}

impl QueueSnapshot {
    pub fn is_busy(&self) -> bool {
        self.jobs.iter().any(|j| j.status.is_active())
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }
}

#[derive(Debug, Default)]
pub struct QueueStore {
    /// Kept in submission order.
    jobs: Vec<QueueJob>,
    policy: BatchPolicy,
    next_seq: u64,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pending job and returns its id.
    pub fn push(&mut self, file: UploadFile) -> String {
        let job = QueueJob::new(file, self.next_seq);
        self.next_seq += 1;
        let id = job.id.clone();
        self.jobs.push(job);
        id
    }

    pub fn jobs(&self) -> &[QueueJob] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&QueueJob> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn active(&self) -> Option<&QueueJob> {
        self.jobs.iter().find(|j| j.status.is_active())
    }

    pub fn is_busy(&self) -> bool {
        self.active().is_some()
    }

    /// Whether any job is pending or active.
    pub fn has_outstanding(&self) -> bool {
        self.jobs
            .iter()
            .any(|j| j.status == JobStatus::Pending || j.status.is_active())
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: BatchPolicy) -> Result<(), QueueError> {
        if self.is_busy() {
            return Err(QueueError::Busy);
        }
        self.policy = policy;
        Ok(())
    }

    /// Moves the earliest pending job to `analyzing` at the given progress
    /// and returns a copy of it. Returns `None` when nothing is pending or a
    /// job is already active.
    pub fn start_next(&mut self, progress: u8) -> Option<QueueJob> {
        if self.is_busy() {
            return None;
        }

        let job = self
            .jobs
            .iter_mut()
            .filter(|j| j.status == JobStatus::Pending)
            .min_by_key(|j| j.seq)?;

        job.status = JobStatus::Analyzing;
        job.progress = job.progress.max(progress);
        Some(job.clone())
    }

    /// Applies a lifecycle step. Progress never decreases and is forced to
    /// 100 on entering a terminal state.
    pub fn advance(
        &mut self,
        id: &str,
        status: JobStatus,
        progress: u8,
        error: Option<&str>,
    ) -> Result<&QueueJob, TransitionError> {
        if status.is_active() {
            if let Some(active) = self.active() {
                if active.id != id {
                    return Err(TransitionError::AnotherActive {
                        id: id.to_string(),
                        active: active.id.clone(),
                    });
                }
            }
        }

        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| TransitionError::UnknownJob(id.to_string()))?;

        if !job.status.can_transition_to(status) {
            return Err(TransitionError::Illegal {
                id: id.to_string(),
                from: job.status,
                to: status,
            });
        }

        job.status = status;
        job.progress = if status.is_terminal() {
            100
        } else {
            job.progress.max(progress.min(100))
        };
        if let Some(message) = error {
            job.error = Some(message.to_string());
        }

        Ok(job)
    }

    /// Removes a pending or finished job.
    pub fn remove(&mut self, id: &str) -> Result<QueueJob, QueueError> {
        let index = self
            .jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or_else(|| QueueError::JobNotFound(id.to_string()))?;

        if self.jobs[index].status.is_active() {
            return Err(QueueError::JobActive(id.to_string()));
        }

        Ok(self.jobs.remove(index))
    }

    /// Drops every completed or failed job and returns how many went.
    pub fn clear_finished(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|j| !j.status.is_terminal());
        before - self.jobs.len()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            jobs: self.jobs.clone(),
            policy: self.policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadFile {
        UploadFile::from_bytes(name, Some("application/pdf"), vec![0; 8])
    }

    fn store_with(names: &[&str]) -> (QueueStore, Vec<String>) {
        let mut store = QueueStore::new();
        let ids = names.iter().map(|n| store.push(file(n))).collect();
        (store, ids)
    }

    #[test]
    fn test_push_keeps_submission_order_and_allows_duplicates() {
        let (store, ids) = store_with(&["a.pdf", "a.pdf", "b.pdf"]);
        assert_eq!(store.jobs().len(), 3);
        assert_ne!(ids[0], ids[1]);
        let seqs: Vec<u64> = store.jobs().iter().map(|j| j.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert!(store
            .jobs()
            .iter()
            .all(|j| j.status == JobStatus::Pending && j.progress == 0));
    }

    #[test]
    fn test_start_next_is_fifo_and_single() {
        let (mut store, ids) = store_with(&["a.pdf", "b.pdf"]);

        let first = store.start_next(20).unwrap();
        assert_eq!(first.id, ids[0]);
        assert_eq!(first.status, JobStatus::Analyzing);
        assert_eq!(first.progress, 20);

        // Busy: nothing else may start.
        assert!(store.start_next(20).is_none());

        store.advance(&ids[0], JobStatus::Failed, 100, Some("x")).unwrap();
        assert_eq!(store.start_next(20).unwrap().id, ids[1]);
    }

    #[test]
    fn test_start_next_skips_removed_jobs() {
        let (mut store, ids) = store_with(&["a.pdf", "b.pdf"]);
        store.remove(&ids[0]).unwrap();
        assert_eq!(store.start_next(20).unwrap().id, ids[1]);
    }

    #[test]
    fn test_advance_full_lifecycle() {
        let (mut store, ids) = store_with(&["a.pdf"]);
        let id = &ids[0];
        store.start_next(20).unwrap();

        assert_eq!(
            store.advance(id, JobStatus::Analyzing, 40, None).unwrap().progress,
            40
        );
        assert_eq!(
            store.advance(id, JobStatus::Saving, 80, None).unwrap().progress,
            80
        );
        let done = store.advance(id, JobStatus::Completed, 100, None).unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.progress, 100);
    }

    #[test]
    fn test_progress_never_decreases() {
        let (mut store, ids) = store_with(&["a.pdf"]);
        store.start_next(20).unwrap();
        store.advance(&ids[0], JobStatus::Analyzing, 40, None).unwrap();
        let job = store.advance(&ids[0], JobStatus::Analyzing, 10, None).unwrap();
        assert_eq!(job.progress, 40);
    }

    #[test]
    fn test_failure_forces_progress_to_100() {
        let (mut store, ids) = store_with(&["a.pdf"]);
        store.start_next(20).unwrap();
        let job = store
            .advance(&ids[0], JobStatus::Failed, 0, Some("Failed to process document"))
            .unwrap();
        assert_eq!(job.progress, 100);
        assert_eq!(job.error.as_deref(), Some("Failed to process document"));
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let (mut store, ids) = store_with(&["a.pdf"]);
        store.start_next(20).unwrap();
        store.advance(&ids[0], JobStatus::Failed, 100, None).unwrap();

        for next in [
            JobStatus::Pending,
            JobStatus::Analyzing,
            JobStatus::Saving,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert!(matches!(
                store.advance(&ids[0], next, 100, None),
                Err(TransitionError::Illegal { .. })
            ));
        }
        assert_eq!(store.get(&ids[0]).unwrap().status, JobStatus::Failed);
    }

    #[test]
    fn test_second_active_job_rejected() {
        let (mut store, ids) = store_with(&["a.pdf", "b.pdf"]);
        store.start_next(20).unwrap();

        let err = store
            .advance(&ids[1], JobStatus::Analyzing, 20, None)
            .unwrap_err();
        assert!(matches!(err, TransitionError::AnotherActive { .. }));
        assert_eq!(store.jobs().iter().filter(|j| j.status.is_active()).count(), 1);
    }

    #[test]
    fn test_unknown_job() {
        let mut store = QueueStore::new();
        assert_eq!(
            store.advance("q-missing", JobStatus::Failed, 100, None).unwrap_err(),
            TransitionError::UnknownJob("q-missing".to_string())
        );
    }

    #[test]
    fn test_remove_rules() {
        let (mut store, ids) = store_with(&["a.pdf", "b.pdf"]);
        store.start_next(20).unwrap();

        assert_eq!(
            store.remove(&ids[0]).unwrap_err(),
            QueueError::JobActive(ids[0].clone())
        );
        assert_eq!(
            store.remove("q-missing").unwrap_err(),
            QueueError::JobNotFound("q-missing".to_string())
        );
        assert_eq!(store.remove(&ids[1]).unwrap().id, ids[1]);
        assert_eq!(store.jobs().len(), 1);
    }

    #[test]
    fn test_clear_finished_is_idempotent() {
        let (mut store, ids) = store_with(&["a.pdf", "b.pdf", "c.pdf"]);
        store.start_next(20).unwrap();
        store.advance(&ids[0], JobStatus::Failed, 100, None).unwrap();
        store.start_next(20).unwrap();

        assert_eq!(store.clear_finished(), 1);
        let after_first: Vec<String> = store.jobs().iter().map(|j| j.id.clone()).collect();
        assert_eq!(store.clear_finished(), 0);
        let after_second: Vec<String> = store.jobs().iter().map(|j| j.id.clone()).collect();

        assert_eq!(after_first, after_second);
        assert_eq!(after_first, vec![ids[1].clone(), ids[2].clone()]);
    }

    #[test]
    fn test_policy_locked_while_busy() {
        let (mut store, ids) = store_with(&["a.pdf"]);
        assert!(store.set_policy(BatchPolicy::Income).is_ok());

        store.start_next(20).unwrap();
        assert_eq!(store.set_policy(BatchPolicy::Expense), Err(QueueError::Busy));
        assert_eq!(store.policy(), BatchPolicy::Income);

        store.advance(&ids[0], JobStatus::Failed, 100, None).unwrap();
        assert!(store.set_policy(BatchPolicy::Expense).is_ok());
    }

    #[test]
    fn test_outstanding_and_snapshot() {
        let (mut store, ids) = store_with(&["a.pdf"]);
        assert!(store.has_outstanding());

        store.start_next(20).unwrap();
        assert!(store.has_outstanding());
        store.advance(&ids[0], JobStatus::Failed, 100, None).unwrap();
        assert!(!store.has_outstanding());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.count(JobStatus::Failed), 1);
        assert!(!snapshot.is_busy());
    }
}
