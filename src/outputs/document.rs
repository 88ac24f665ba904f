//! Destination documents: a preserved metadata block plus a regenerated body.
//!
//! A destination file looks like:
//!
//! ```text
//! ---
//! title: News
//! layout: page
//! ---
//!
//! ### January 5, 2024
//! …
//! ```
//!
//! The block between the `---` lines is kept byte-for-byte across runs; the
//! body after it is always replaced in full.

use crate::error::SyncError;
use crate::models::Category;
use crate::utils::{ensure_parent_dir, today};
use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Line that opens and closes the metadata block.
pub const DELIMITER: &str = "---";

/// A destination file split into its metadata block and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Text between the delimiter lines, without the delimiters.
    pub header: String,
    pub body: String,
}

impl Document {
    /// Split `text` into header and body.
    ///
    /// Returns `Ok(None)` when the text does not start with a delimiter line.
    /// A delimiter line that is never closed is an error.
    pub fn parse(text: &str) -> Result<Option<Document>, String> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.split_inclusive('\n');
        let Some(first) = lines.next() else {
            return Ok(None);
        };
        if first.trim_end() != DELIMITER {
            return Ok(None);
        }

        let start = first.len();
        let mut offset = start;
        for line in lines {
            if line.trim_end() == DELIMITER {
                let raw = &text[start..offset];
                let header = raw
                    .strip_suffix('\n')
                    .map(|h| h.strip_suffix('\r').unwrap_or(h))
                    .unwrap_or(raw);
                let body = text[offset + line.len()..].trim_start_matches(['\r', '\n']);
                return Ok(Some(Document {
                    header: header.to_string(),
                    body: body.to_string(),
                }));
            }
            offset += line.len();
        }
        Err(format!("metadata block opened with `{DELIMITER}` is never closed"))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{DELIMITER}")?;
        if !self.header.is_empty() {
            writeln!(f, "{}", self.header)?;
        }
        writeln!(f, "{DELIMITER}")?;
        writeln!(f)?;
        writeln!(f, "{}", self.body.trim_end())
    }
}

#[derive(Debug, Serialize)]
struct DefaultFrontMatter<'a> {
    title: &'a str,
    date: &'a str,
}

/// Metadata block used when the destination has none.
pub fn default_header(category: Category, date: &str) -> Result<String, SyncError> {
    let yaml = serde_yaml::to_string(&DefaultFrontMatter {
        title: category.title(),
        date,
    })?;
    Ok(yaml.trim_end().to_string())
}

/// Header to keep for `path`, falling back to a synthesized one.
///
/// An absent or unreadable file, or one without a metadata block, gets the
/// default header. A metadata block that is opened but never closed is a
/// [`SyncError::Parse`].
#[instrument(level = "info", skip_all, fields(path = %path.display(), %category))]
pub async fn existing_header(path: &Path, category: Category) -> Result<String, SyncError> {
    match fs::read_to_string(path).await {
        Ok(existing) => match Document::parse(&existing) {
            Ok(Some(doc)) => {
                info!(bytes = doc.header.len(), "Preserving existing metadata block");
                Ok(doc.header)
            }
            Ok(None) => {
                warn!("Destination has no metadata block; using default header");
                default_header(category, &today())
            }
            Err(reason) => Err(SyncError::Parse {
                path: path.to_path_buf(),
                reason,
            }),
        },
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                info!("Destination does not exist yet; using default header");
            } else {
                warn!(error = %e, "Cannot read destination; using default header");
            }
            default_header(category, &today())
        }
    }
}

/// Replace the body of `path` with `body`, keeping its metadata block.
///
/// The write is unconditional and replaces the whole file. Missing parent
/// directories are created.
#[instrument(level = "info", skip_all, fields(path = %path.display(), %category, bytes = body.len()))]
pub async fn merge_and_write(path: &Path, category: Category, body: &str) -> Result<(), SyncError> {
    let doc = Document {
        header: existing_header(path, category).await?,
        body: body.to_string(),
    };
    ensure_parent_dir(path).await?;
    fs::write(path, doc.to_string())
        .await
        .map_err(|e| SyncError::io(path, e))?;
    info!("Wrote destination file");
    Ok(())
}
