//! Helpers for sanitizing data before it enters tracing span attributes and
//! log lines.
//!
//! Traces are safe to share for debugging; these functions keep local paths
//! and API keys out of them.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Masks the value of a `key=` query parameter in a URL.
///
/// - `https://host/v1/models?key=AIza123` → `https://host/v1/models?key=****`
/// - `https://host/v1/models` → unchanged
pub fn redact_url_key(url: &str) -> String {
    let Some(query_start) = url.find('?') else {
        return url.to_string();
    };

    let (base, query) = url.split_at(query_start + 1);
    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name.eq_ignore_ascii_case("key") => format!("{}=****", name),
            _ => pair.to_string(),
        })
        .collect();

    format!("{}{}", base, redacted.join("&"))
}
