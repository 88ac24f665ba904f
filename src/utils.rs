//! Small helpers for handles, dates, log output and destination directories.

use chrono::{DateTime, Local, Utc};
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

use crate::error::SyncError;

/// Strip surrounding whitespace and a single leading `@` from a handle.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_handle("@alice.bsky.social"), "alice.bsky.social");
/// ```
pub fn normalize_handle(handle: &str) -> &str {
    let trimmed = handle.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed)
}

/// Long-form date used for post headings, e.g. `January 5, 2024`.
pub fn long_date(ts: &DateTime<Utc>) -> String {
    ts.format("%B %-d, %Y").to_string()
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended. Cuts always land on a character boundary.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Create the parent directory of `path` if it does not exist yet.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::io(parent, e))?;
        debug!(dir = %parent.display(), "Destination directory ready");
    }
    Ok(())
}
