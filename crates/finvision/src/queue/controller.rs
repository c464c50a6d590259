//! The upload queue handle and its single background worker.
//!
//! Jobs are drained one at a time in submission order. Each run reads and
//! encodes the file, asks the extractor for fields, resolves the transaction
//! type against the batch policy and hands a record pair to the sink. Every
//! lifecycle step is broadcast as a [`QueueEvent`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinHandle;
use tracing::{info_span, Instrument};

use super::job::{JobStatus, QueueJob, UploadFile};
use super::policy::BatchPolicy;
use super::sink::RecordSink;
use super::store::{QueueSnapshot, QueueStore};
use super::{PROCESS_FAILED, SAVE_FAILED};
use crate::broadcast::{JobProgressEvent, QueueEvent, QueueEventBroadcaster};
use crate::config::Config;
use crate::error::QueueError;
use crate::extraction::{EncodedDocument, ExtractionRequest, Extractor};
use crate::ledger::{new_record_id, DocumentRecord, Transaction};

const PROGRESS_ANALYZING: u8 = 20;
const PROGRESS_EXTRACTING: u8 = 40;
const PROGRESS_SAVING: u8 = 80;
const PROGRESS_DONE: u8 = 100;

/// Settings for an [`UploadQueue`].
#[derive(Debug, Clone)]
pub struct QueueOptions {
    /// Display name passed to the extraction service.
    pub user_name: String,
    /// Capacity of the event channel. Slow subscribers past this lag.
    pub event_capacity: usize,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            user_name: "Business Owner".to_string(),
            event_capacity: 256,
        }
    }
}

impl QueueOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_name: config.extraction.user_name.clone(),
            event_capacity: config.queue.event_capacity,
        }
    }
}

/// State shared between the handle and the worker task.
struct Shared {
    store: RwLock<QueueStore>,
    events: QueueEventBroadcaster,
    kick: Notify,
    idle_tx: watch::Sender<bool>,
    shutdown: AtomicBool,
    extractor: Arc<dyn Extractor>,
    sink: Arc<dyn RecordSink>,
    user_name: String,
}

/// Counters for the current run of work, reset on every drain.
#[derive(Debug, Default)]
struct BatchTally {
    completed: usize,
    failed: usize,
}

impl BatchTally {
    fn is_empty(&self) -> bool {
        self.completed == 0 && self.failed == 0
    }
}

/// Sequential upload/extraction queue.
///
/// Must be created inside a tokio runtime: the worker task is spawned on
/// construction and lives until [`UploadQueue::shutdown`] or drop.
pub struct UploadQueue {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl UploadQueue {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        sink: Arc<dyn RecordSink>,
        options: QueueOptions,
    ) -> Self {
        let (idle_tx, _) = watch::channel(true);
        let shared = Arc::new(Shared {
            store: RwLock::new(QueueStore::new()),
            events: QueueEventBroadcaster::new(options.event_capacity),
            kick: Notify::new(),
            idle_tx,
            shutdown: AtomicBool::new(false),
            extractor,
            sink,
            user_name: options.user_name,
        });

        let worker = tokio::spawn(run_worker(Arc::clone(&shared)));
        info!("Upload queue started");

        Self {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Appends one pending job per file, in order, and wakes the worker.
    pub fn submit(&self, files: Vec<UploadFile>) -> Result<Vec<String>, QueueError> {
        if self.shared.shutdown.load(Ordering::SeqCst) {
            return Err(QueueError::ShutDown);
        }
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let mut submitted = Vec::with_capacity(files.len());
        {
            let mut store = self.shared.write_store();
            for file in files {
                let filename = file.name.clone();
                let id = store.push(file);
                submitted.push((id, filename));
            }
            self.shared.idle_tx.send_replace(false);
        }

        for (job_id, filename) in &submitted {
            debug!("Queued job {} ({})", job_id, filename);
            self.shared.events.send(QueueEvent::JobSubmitted {
                job_id: job_id.clone(),
                filename: filename.clone(),
            });
        }
        self.shared.kick.notify_one();

        Ok(submitted.into_iter().map(|(id, _)| id).collect())
    }

    /// Changes how the next processed documents are classified.
    pub fn set_batch_policy(&self, policy: BatchPolicy) -> Result<(), QueueError> {
        self.shared.write_store().set_policy(policy)?;
        info!("Batch policy set to {}", policy);
        self.shared.events.send(QueueEvent::PolicyChanged { policy });
        Ok(())
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        self.shared.read_store().policy()
    }

    /// Removes a pending or finished job. The active job cannot be removed.
    pub fn remove_job(&self, id: &str) -> Result<(), QueueError> {
        let removed = self.shared.write_store().remove(id)?;
        debug!("Removed job {} ({})", removed.id, removed.file.name);
        self.shared.events.send(QueueEvent::JobRemoved { job_id: removed.id });
        Ok(())
    }

    /// Drops every completed or failed job. Returns how many were removed.
    pub fn clear_finished(&self) -> usize {
        let count = self.shared.write_store().clear_finished();
        if count > 0 {
            debug!("Cleared {} finished jobs", count);
        }
        self.shared.events.send(QueueEvent::FinishedCleared { count });
        count
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.shared.read_store().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.shared.events.subscribe()
    }

    /// Resolves once no job is pending or active.
    pub async fn wait_until_idle(&self) {
        let mut idle = self.shared.idle_tx.subscribe();
        // The sender lives in `shared`, so this only errors if the queue is gone.
        let _ = idle.wait_for(|is_idle| *is_idle).await;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
    }

    /// Stops the worker after the job it is currently running, if any.
    /// Pending jobs stay pending. Safe to call more than once.
    pub async fn shutdown(&self) {
        info!("Shutting down upload queue...");
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.kick.notify_one();

        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => {
                warn!("Worker handle lock was poisoned, recovering");
                poisoned.into_inner().take()
            }
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Queue worker ended abnormally: {}", e);
            }
        }

        self.shared.idle_tx.send_replace(true);
        info!("Upload queue stopped");
    }
}

impl Drop for UploadQueue {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.kick.notify_one();
    }
}

impl Shared {
    fn read_store(&self) -> RwLockReadGuard<'_, QueueStore> {
        match self.store.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Queue store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, QueueStore> {
        match self.store.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Queue store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Starts the earliest pending job, if no other job is active.
    fn claim_next(&self) -> Option<QueueJob> {
        let job = self.write_store().start_next(PROGRESS_ANALYZING)?;
        self.events
            .send(QueueEvent::JobProgress(JobProgressEvent::from_job(&job)));
        Some(job)
    }

    /// Applies a lifecycle step and broadcasts the resulting job state.
    fn transition(&self, id: &str, status: JobStatus, progress: u8, error: Option<&str>) {
        let event = {
            let mut store = self.write_store();
            match store.advance(id, status, progress, error) {
                Ok(job) => JobProgressEvent::from_job(job),
                Err(e) => {
                    warn!("Ignoring queue transition: {}", e);
                    return;
                }
            }
        };
        self.events.send(QueueEvent::JobProgress(event));
    }

    fn fail(&self, id: &str, message: &str) {
        self.transition(id, JobStatus::Failed, PROGRESS_DONE, Some(message));
    }

}

async fn run_worker(shared: Arc<Shared>) {
    debug!("Queue worker started");
    let mut tally = BatchTally::default();

    loop {
        if shared.shutdown.load(Ordering::SeqCst) {
            debug!("Queue worker received shutdown signal");
            break;
        }

        if let Some(job) = shared.claim_next() {
            let id = job.id.clone();
            let span = info_span!("pipeline", job_id = %job.id, filename = %job.file.name);
            let run = tokio::spawn(process_job(Arc::clone(&shared), job).instrument(span));

            let outcome = match run.await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Pipeline for job {} aborted: {}", id, e);
                    shared.fail(&id, PROCESS_FAILED);
                    JobStatus::Failed
                }
            };
            match outcome {
                JobStatus::Completed => tally.completed += 1,
                _ => tally.failed += 1,
            }
            continue;
        }

        if !tally.is_empty() {
            info!(
                "Queue drained: {} completed, {} failed",
                tally.completed, tally.failed
            );
            shared.events.send(QueueEvent::Drained {
                completed: tally.completed,
                failed: tally.failed,
            });
            shared.sink.batch_drained().await;
            tally = BatchTally::default();
        }

        {
            let store = shared.read_store();
            if store.has_outstanding() {
                continue;
            }
            shared.idle_tx.send_replace(true);
        }

        shared.kick.notified().await;
    }

    debug!("Queue worker stopped");
}

/// Runs one claimed job to a terminal state and returns that state.
async fn process_job(shared: Arc<Shared>, job: QueueJob) -> JobStatus {
    let bytes = match job.file.read_bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(
                "Could not read '{}': {}",
                job.file
                    .path()
                    .map(crate::sanitize::redact_path)
                    .unwrap_or_else(|| job.file.name.clone()),
                e
            );
            shared.fail(&job.id, PROCESS_FAILED);
            return JobStatus::Failed;
        }
    };

    let encoded = {
        let _step = info_span!("encode").entered();
        EncodedDocument::encode(&bytes, &job.file.mime_type)
    };

    shared.transition(&job.id, JobStatus::Analyzing, PROGRESS_EXTRACTING, None);

    let request = ExtractionRequest {
        payload: &encoded.payload,
        mime_type: &encoded.mime_type,
        user_name: &shared.user_name,
    };
    let result = match shared
        .extractor
        .extract(request)
        .instrument(info_span!("extract"))
        .await
    {
        Ok(result) => result,
        Err(e) => {
            warn!("Extraction failed for job {}: {}", job.id, e);
            shared.fail(&job.id, PROCESS_FAILED);
            return JobStatus::Failed;
        }
    };

    shared.transition(&job.id, JobStatus::Saving, PROGRESS_SAVING, None);

    let policy = shared.read_store().policy();
    let kind = policy.resolve(result.inferred_type.as_deref());
    debug!(
        "Resolved type {} (policy {}, inferred {:?})",
        kind.as_str(),
        policy,
        result.inferred_type
    );

    let document = DocumentRecord::completed(&job.file.name, bytes.len() as u64);
    let transaction = Transaction {
        id: new_record_id("tr"),
        date: result.date.clone(),
        vendor: result.vendor.clone(),
        amount: result.total_amount,
        tax: result.tax(),
        category: result.category.clone(),
        currency: result.currency.clone(),
        kind,
        document_id: document.id.clone(),
        document_data: Some(encoded.data_url()),
        mime_type: Some(encoded.mime_type.clone()),
    };

    let emitted = shared
        .sink
        .accept(document, transaction)
        .instrument(info_span!("emit"))
        .await;
    match emitted {
        Ok(()) => {
            shared.transition(&job.id, JobStatus::Completed, PROGRESS_DONE, None);
            info!("Job {} completed", job.id);
            JobStatus::Completed
        }
        Err(e) => {
            warn!("Record sink rejected job {}: {}", job.id, e);
            shared.fail(&job.id, SAVE_FAILED);
            JobStatus::Failed
        }
    }
}
