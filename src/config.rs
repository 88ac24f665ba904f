//! Immutable run configuration, built once from the command line.

use crate::cli::Cli;
use crate::error::SyncError;
use crate::models::Category;
use crate::utils::normalize_handle;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Everything a run needs, validated up front.
///
/// Constructing a `Config` is the only place inputs are checked; no network
/// client exists until this succeeds.
#[derive(Clone)]
pub struct Config {
    /// Author handle with any leading `@` removed.
    pub handle: String,
    pub app_password: String,
    /// Service base URL, always ending in `/`.
    pub service_url: Url,
    pub news_path: PathBuf,
    pub announcement_path: PathBuf,
    pub limit: u8,
    pub max_posts: usize,
    pub dry_run: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, SyncError> {
        let handle = cli
            .handle
            .as_deref()
            .map(normalize_handle)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SyncError::Config("BLUESKY_HANDLE is not set".into()))?
            .to_string();
        let app_password = cli
            .app_password
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| SyncError::Config("BLUESKY_APP_PASSWORD is not set".into()))?;

        let mut service = cli.service_url.trim().to_string();
        if !service.ends_with('/') {
            service.push('/');
        }
        let service_url = Url::parse(&service)
            .map_err(|e| SyncError::Config(format!("invalid service URL {service}: {e}")))?;

        if cli.max_posts == 0 {
            return Err(SyncError::Config("--max-posts must be at least 1".into()));
        }

        Ok(Self {
            handle,
            app_password,
            service_url,
            news_path: cli.news_path,
            announcement_path: cli.announcement_path,
            limit: cli.limit,
            max_posts: cli.max_posts,
            dry_run: cli.dry_run,
        })
    }

    /// Destination file for `category`.
    pub fn destination(&self, category: Category) -> &Path {
        match category {
            Category::News => &self.news_path,
            Category::Announcement => &self.announcement_path,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("handle", &self.handle)
            .field("app_password", &"<redacted>")
            .field("service_url", &self.service_url.as_str())
            .field("news_path", &self.news_path)
            .field("announcement_path", &self.announcement_path)
            .field("limit", &self.limit)
            .field("max_posts", &self.max_posts)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
