//! Error taxonomy for a sync run.
//!
//! Every stage of the pipeline returns [`SyncError`]. None of the variants are
//! retried; the caller either skips the affected category (render failures)
//! or aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while syncing posts into site content.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required input missing or invalid. Raised before any network activity.
    #[error("configuration error: {0}")]
    Config(String),

    /// The session endpoint rejected the credentials.
    #[error("authentication failed: {code}: {message}")]
    Auth { code: String, message: String },

    /// The author feed endpoint returned a non-success response.
    #[error("feed fetch failed ({status}): {code}: {message}")]
    Fetch {
        status: u16,
        code: String,
        message: String,
    },

    /// Transport-level failure talking to the remote service.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A post could not be rendered.
    #[error("cannot render post {uri}: {reason}")]
    Render { uri: String, reason: String },

    /// An existing destination file has a malformed metadata block.
    #[error("cannot parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// Reading or writing a destination file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The default metadata block could not be serialized.
    #[error("cannot serialize metadata: {0}")]
    Metadata(#[from] serde_yaml::Error),
}

impl SyncError {
    pub fn render(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Render {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Auth { .. } => "auth",
            Self::Fetch { .. } => "fetch",
            Self::Http(_) => "http",
            Self::Render { .. } => "render",
            Self::Parse { .. } => "parse",
            Self::Io { .. } => "io",
            Self::Metadata(_) => "metadata",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = SyncError::Auth {
            code: "AuthenticationRequired".to_string(),
            message: "Invalid identifier or password".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "authentication failed: AuthenticationRequired: Invalid identifier or password"
        );
        assert_eq!(err.kind(), "auth");
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = SyncError::io(
            "content/news.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("content/news.md"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_render_helper() {
        let err = SyncError::render("at://x", "missing text");
        assert_eq!(err.to_string(), "cannot render post at://x: missing text");
    }
}
