//! Queue harness: an `UploadQueue` wired to scripted doubles.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use finvision::queue::{JobStatus, QueueOptions, UploadFile, UploadQueue};

use super::doubles::{RecordingSink, ScriptedExtractor};

pub struct QueueHarness {
    pub queue: UploadQueue,
    pub extractor: Arc<ScriptedExtractor>,
    pub sink: Arc<RecordingSink>,
}

impl QueueHarness {
    pub fn new() -> Self {
        Self::with_extractor(ScriptedExtractor::new())
    }

    pub fn gated() -> Self {
        Self::with_extractor(ScriptedExtractor::gated())
    }

    fn with_extractor(extractor: ScriptedExtractor) -> Self {
        let extractor = Arc::new(extractor);
        let sink = Arc::new(RecordingSink::new());
        let queue = UploadQueue::new(extractor.clone(), sink.clone(), QueueOptions::default());
        Self {
            queue,
            extractor,
            sink,
        }
    }

    /// An in-memory PDF whose contents are its own name.
    pub fn file(name: &str) -> UploadFile {
        UploadFile::from_bytes(name, Some("application/pdf"), name.as_bytes().to_vec())
    }

    pub fn submit(&self, names: &[&str]) -> Vec<String> {
        self.queue
            .submit(names.iter().map(|n| Self::file(n)).collect())
            .expect("submit")
    }

    pub async fn idle(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.queue.wait_until_idle())
            .await
            .expect("queue did not go idle");
    }

    /// Polls until the job reaches `status`.
    pub async fn wait_for(&self, id: &str, status: JobStatus) {
        let wait = async {
            loop {
                let current = self
                    .queue
                    .snapshot()
                    .jobs
                    .iter()
                    .find(|j| j.id == id)
                    .map(|j| j.status);
                if current == Some(status) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .unwrap_or_else(|_| panic!("job {} never reached {}", id, status));
    }

    pub fn status(&self, id: &str) -> Option<JobStatus> {
        self.queue
            .snapshot()
            .jobs
            .iter()
            .find(|j| j.id == id)
            .map(|j| j.status)
    }
}
