use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const OCTET_STREAM: &str = "application/octet-stream";

/// Lifecycle state of a queued upload.
///
/// `Pending → Analyzing → Saving → Completed`, and any non-terminal state may
/// go to `Failed`. Terminal states never change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Analyzing,
    Saving,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Analyzing => "analyzing",
            JobStatus::Saving => "saving",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// The job is mid-pipeline.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Analyzing | JobStatus::Saving)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Analyzing => 1,
            JobStatus::Saving => 2,
            JobStatus::Completed | JobStatus::Failed => 3,
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`. Staying in
    /// the same non-terminal state is allowed so progress can advance.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            JobStatus::Failed => true,
            JobStatus::Completed => *self == JobStatus::Saving,
            _ => next.rank() >= self.rank() && next.rank() <= self.rank() + 1,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an upload's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A file handed to the queue: name, declared MIME type, size and bytes.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    /// Size in bytes as known at submission (0 if it could not be read).
    pub size: u64,
    pub source: FileSource,
}

impl UploadFile {
    /// Describes a file on disk. The MIME type is guessed from the extension
    /// and the size read from metadata; the contents are read when the job
    /// is processed.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            name,
            mime_type: detect_mime_type(&path),
            size,
            source: FileSource::Path(path),
        }
    }

    /// Wraps an in-memory blob. Without a declared MIME type one is guessed
    /// from the file name.
    pub fn from_bytes(name: &str, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let mime_type = mime_type
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| detect_mime_type(Path::new(name)));

        Self {
            name: name.to_string(),
            mime_type,
            size: bytes.len() as u64,
            source: FileSource::Bytes(Arc::from(bytes)),
        }
    }

    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Filesystem path, if the file came from disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Bytes(_) => None,
        }
    }
}

/// Guesses a MIME type from the file extension.
pub fn detect_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// One submitted file and its progress through the pipeline.
#[derive(Debug, Clone)]
pub struct QueueJob {
    pub id: String,
    pub file: UploadFile,
    pub status: JobStatus,
    /// 0-100, never decreases.
    pub progress: u8,
    pub error: Option<String>,
    /// Submission order within the queue.
    pub seq: u64,
    pub submitted_at: DateTime<Utc>,
}

impl QueueJob {
    pub(crate) fn new(file: UploadFile, seq: u64) -> Self {
        Self {
            id: format!("q-{}", uuid::Uuid::new_v4().simple()),
            file,
            status: JobStatus::Pending,
            progress: 0,
            error: None,
            seq,
            submitted_at: Utc::now(),
        }
    }
}
