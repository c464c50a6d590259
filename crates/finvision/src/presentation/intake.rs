use std::path::PathBuf;

use log::debug;

use crate::queue::UploadFile;

/// Whether the file picker accepts this MIME type (`image/*` or PDF).
pub fn is_accepted_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}

/// Uploads for paths chosen in the file picker. Files outside the accept
/// filter are skipped.
pub fn files_from_paths<I, P>(paths: I) -> Vec<UploadFile>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .map(UploadFile::from_path)
        .filter(|file| {
            let accepted = is_accepted_mime(&file.mime_type);
            if !accepted {
                debug!("Skipping '{}' ({})", file.name, file.mime_type);
            }
            accepted
        })
        .collect()
}

/// Uploads for dropped paths. Nothing is filtered; unsupported files fail
/// at extraction.
pub fn files_from_dropped<I, P>(paths: I) -> Vec<UploadFile>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths.into_iter().map(UploadFile::from_path).collect()
}
