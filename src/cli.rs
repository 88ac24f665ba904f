//! Command-line interface definitions for the site sync job.
//!
//! Every option can be given as a flag or through an environment variable, so
//! a CI job can configure the run entirely through its secrets and env block.

use crate::bluesky::feed::DEFAULT_LIMIT;
use crate::classify::DEFAULT_MAX_POSTS;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for a sync run.
///
/// # Examples
///
/// ```sh
/// # Credentials from the environment, default output paths
/// BLUESKY_HANDLE=@alice.bsky.social BLUESKY_APP_PASSWORD=xxxx-xxxx bsky_site_sync
///
/// # Custom destinations, render only
/// bsky_site_sync --news-path site/news.md --announcement-path site/ann.md --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Author handle, with or without a leading `@`
    #[arg(long, env = "BLUESKY_HANDLE")]
    pub handle: Option<String>,

    /// App-scoped password for the author account
    #[arg(long, env = "BLUESKY_APP_PASSWORD", hide_env_values = true)]
    pub app_password: Option<String>,

    /// Base URL of the service hosting the account
    #[arg(long, env = "BLUESKY_SERVICE_URL", default_value = "https://bsky.social")]
    pub service_url: String,

    /// Destination file for posts tagged #news
    #[arg(long, env = "NEWS_PATH", default_value = "content/news.md")]
    pub news_path: PathBuf,

    /// Destination file for posts tagged #announcement or #announce
    #[arg(long, env = "ANNOUNCEMENT_PATH", default_value = "content/announcements.md")]
    pub announcement_path: PathBuf,

    /// Number of recent posts to request from the author feed (1-100)
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u8,

    /// Maximum posts rendered per category
    #[arg(long, default_value_t = DEFAULT_MAX_POSTS)]
    pub max_posts: usize,

    /// Render and log the output without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["bsky_site_sync", "--handle", "@alice", "--app-password", "pw"]);
        assert_eq!(cli.handle.as_deref(), Some("@alice"));
        assert_eq!(cli.service_url, "https://bsky.social");
        assert_eq!(cli.news_path, PathBuf::from("content/news.md"));
        assert_eq!(cli.announcement_path, PathBuf::from("content/announcements.md"));
        assert_eq!(cli.limit, 50);
        assert_eq!(cli.max_posts, 3);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "bsky_site_sync",
            "--handle",
            "bob",
            "--app-password",
            "pw",
            "--news-path",
            "/tmp/n.md",
            "--limit",
            "20",
            "--max-posts",
            "5",
            "--dry-run",
        ]);
        assert_eq!(cli.news_path, PathBuf::from("/tmp/n.md"));
        assert_eq!(cli.limit, 20);
        assert_eq!(cli.max_posts, 5);
        assert!(cli.dry_run);
    }
}
