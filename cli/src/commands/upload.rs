//! Runs a batch through the upload queue with live per-file progress bars.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use finvision::presentation::{files_from_dropped, files_from_paths, QueueView};
use finvision::queue::{QueueSnapshot, RecordSink};
use finvision::{
    BatchPolicy, Extractor, GeminiExtractor, JobStatus, QueueEvent, QueueOptions, UploadQueue,
};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

pub async fn run(
    state: &AppState,
    paths: Vec<PathBuf>,
    policy: BatchPolicy,
    dropped: bool,
) -> anyhow::Result<()> {
    let files = if dropped {
        files_from_dropped(paths)
    } else {
        files_from_paths(paths)
    };
    if files.is_empty() {
        bail!("No images or PDFs to upload (use --dropped to skip the file type filter)");
    }

    let extractor = GeminiExtractor::from_config(&state.config.extraction)
        .context("Failed to set up the extraction client")?;
    if !extractor.has_api_key() {
        bail!(
            "No extraction API key configured; set {} or apiKey/apiKeyFile in the config",
            state.config.extraction.api_key_env_var
        );
    }

    let extractor: Arc<dyn Extractor> = Arc::new(extractor);
    let sink: Arc<dyn RecordSink> = state.store.clone();
    let queue = UploadQueue::new(extractor, sink, QueueOptions::from_config(&state.config));
    queue.set_batch_policy(policy)?;
    info!("Uploading {} file(s) with policy {}", files.len(), policy.label());

    let mut events = queue.subscribe();
    let ids = queue.submit(files)?;

    let bars = ProgressBars::new(&queue.snapshot())?;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event.job_id().is_some_and(|id| !ids.iter().any(|own| own == id)) => {
                    debug!("Ignoring {:?} for a job outside this batch", event.job_id());
                }
                Ok(QueueEvent::JobProgress(progress)) => {
                    bars.update(
                        &progress.job_id,
                        progress.status,
                        progress.progress,
                        progress.error.as_deref(),
                    );
                }
                Ok(QueueEvent::Drained { .. }) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Progress display skipped {} events", skipped);
                    bars.refresh(&queue.snapshot());
                }
                Err(RecvError::Closed) => break,
            },
            _ = queue.wait_until_idle() => break,
        }
    }

    let snapshot = queue.snapshot();
    bars.refresh(&snapshot);
    queue.shutdown().await;

    let view = QueueView::from_snapshot(&snapshot);
    println!(
        "{}: {} of {} completed ({}%), {} failed",
        view.header, view.completed, view.total, view.percent, view.failed
    );
    for row in view.rows.iter().filter(|r| ids.contains(&r.id)) {
        if let Some(error) = &row.error {
            println!("  {} {}: {}", row.status_label, row.file_name, error);
        }
    }

    if view.failed > 0 && view.completed == 0 {
        bail!("No documents could be processed");
    }
    Ok(())
}

/// One bar per job, keyed by job id.
struct ProgressBars {
    bars: HashMap<String, ProgressBar>,
    _multi: MultiProgress,
}

impl ProgressBars {
    fn new(snapshot: &QueueSnapshot) -> anyhow::Result<Self> {
        let multi = MultiProgress::new();
        let style =
            ProgressStyle::with_template("{prefix:30!} [{bar:30.cyan/blue}] {pos:>3}% {msg}")?
                .progress_chars("=> ");

        let bars = snapshot
            .jobs
            .iter()
            .map(|job| {
                let bar = multi.add(ProgressBar::new(100));
                bar.set_style(style.clone());
                bar.set_prefix(job.file.name.clone());
                bar.set_message(job.status.as_str().to_ascii_uppercase());
                (job.id.clone(), bar)
            })
            .collect();

        Ok(Self {
            bars,
            _multi: multi,
        })
    }

    fn update(&self, job_id: &str, status: JobStatus, progress: u8, error: Option<&str>) {
        let Some(bar) = self.bars.get(job_id) else {
            return;
        };
        bar.set_position(u64::from(progress));

        let label = status.as_str().to_ascii_uppercase();
        match (status, error) {
            (JobStatus::Failed, Some(error)) => {
                bar.abandon_with_message(format!("{} {}", label, error))
            }
            (JobStatus::Failed, None) => bar.abandon_with_message(label),
            (JobStatus::Completed, _) => bar.finish_with_message(label),
            _ => bar.set_message(label),
        }
    }

    fn refresh(&self, snapshot: &QueueSnapshot) {
        for job in &snapshot.jobs {
            self.update(&job.id, job.status, job.progress, job.error.as_deref());
        }
    }
}
