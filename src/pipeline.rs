//! The sync run: authenticate, fetch, classify, then render and write each
//! category in turn.
//!
//! Every step is awaited before the next one starts. Categories are processed
//! in [`Category::ALL`] order and share nothing, so a failure in a later
//! category never reverts a file an earlier one already wrote.

use crate::bluesky::{self, FeedFetcher, SessionClient};
use crate::classify::{classify, rank_selection};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::SyncError;
use crate::models::Category;
use crate::outputs::{document, markdown};
use tracing::{error, info, instrument};

/// What happened to each category during a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Posts returned by the feed, after reposts and malformed posts were dropped.
    pub fetched: usize,
    /// Categories whose destination file was rewritten (or rendered, in a dry run).
    pub written: Vec<Category>,
    /// Categories with no matching posts; their files were not touched.
    pub empty: Vec<Category>,
    /// Categories skipped because a post failed to render.
    pub render_failed: Vec<Category>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.render_failed.is_empty()
    }
}

/// Validate `cli` into a [`Config`] and run the pipeline.
///
/// Configuration problems are reported before any network client exists.
pub async fn sync(cli: Cli) -> Result<RunSummary, SyncError> {
    let config = Config::from_cli(cli)?;
    info!(config = ?config, "Configuration loaded");
    run(&config).await
}

/// Run the pipeline with an already validated configuration.
///
/// A post that fails to render skips only its category; every other error
/// aborts the run at the point it is raised.
#[instrument(level = "info", skip_all, fields(handle = %config.handle))]
pub async fn run(config: &Config) -> Result<RunSummary, SyncError> {
    let http = bluesky::http_client()?;
    let session = SessionClient::new(http.clone(), config.service_url.clone());
    let credential = session
        .authenticate(&config.handle, &config.app_password)
        .await?;

    let fetcher = FeedFetcher::new(http, config.service_url.clone());
    let posts = fetcher
        .fetch_recent_posts(&credential, &config.handle, config.limit)
        .await?;

    let mut summary = RunSummary {
        fetched: posts.len(),
        ..RunSummary::default()
    };

    let multi = posts.iter().filter(|p| classify(p).len() > 1).count();
    if multi > 0 {
        info!(posts = multi, "Posts routed into more than one category");
    }

    for category in Category::ALL {
        let selection = rank_selection(&posts, category, config.max_posts);
        if selection.is_empty() {
            info!(%category, "No matching posts; leaving destination untouched");
            summary.empty.push(category);
            continue;
        }

        let body = match markdown::render(&selection, &config.handle) {
            Ok(body) => body,
            Err(e @ SyncError::Render { .. }) => {
                error!(%category, error = %e, "Skipping category after render failure");
                summary.render_failed.push(category);
                continue;
            }
            Err(e) => return Err(e),
        };

        let path = config.destination(category);
        if config.dry_run {
            info!(%category, path = %path.display(), %body, "Dry run; not writing");
        } else {
            document::merge_and_write(path, category, &body).await?;
        }
        info!(%category, posts = selection.len(), "Category synced");
        summary.written.push(category);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;
    use std::path::Path;
    use tokio::fs;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(rkey: &str, text: &str, created_at: &str) -> serde_json::Value {
        json!({"post": {
            "uri": format!("at://did:plc:alice/app.bsky.feed.post/{rkey}"),
            "record": {"text": text, "createdAt": created_at}
        }})
    }

    async fn mock_service(feed: Vec<serde_json::Value>) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.server.createSession"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessJwt": "jwt", "refreshJwt": "r",
                "handle": "alice.bsky.social", "did": "did:plc:alice"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.feed.getAuthorFeed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"feed": feed})))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn cli_for(server_uri: &str, dir: &Path, extra: &[&str]) -> Cli {
        let news = dir.join("news.md");
        let ann = dir.join("announcements.md");
        let mut args = vec![
            "bsky_site_sync".to_string(),
            "--handle".to_string(),
            "@alice.bsky.social".to_string(),
            "--app-password".to_string(),
            "pw".to_string(),
            "--service-url".to_string(),
            server_uri.to_string(),
            "--news-path".to_string(),
            news.display().to_string(),
            "--announcement-path".to_string(),
            ann.display().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::parse_from(args)
    }

    #[tokio::test]
    async fn test_sync_writes_ranked_news_and_leaves_empty_category_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ann_path = dir.path().join("announcements.md");
        let ann_original = "---\ntitle: Announcements\n---\n\nhand written\n";
        fs::write(&ann_path, ann_original).await.unwrap();
        let news_path = dir.path().join("news.md");
        fs::write(&news_path, "---\ntitle: Site News\n---\n\nold\n")
            .await
            .unwrap();

        let server = mock_service(vec![
            item("jan", "Jan #news", "2024-01-01T00:00:00Z"),
            item("mar", "Mar #NEWS", "2024-03-01T00:00:00Z"),
            item("feb", "Feb #news", "2024-02-01T00:00:00Z"),
            item("dec", "Dec #news", "2023-12-01T00:00:00Z"),
            item("misc", "nothing tagged", "2024-04-01T00:00:00Z"),
        ])
        .await;

        let summary = sync(cli_for(&server.uri(), dir.path(), &[])).await.unwrap();
        assert_eq!(summary.fetched, 5);
        assert_eq!(summary.written, vec![Category::News]);
        assert_eq!(summary.empty, vec![Category::Announcement]);
        assert!(summary.is_clean());

        let news = fs::read_to_string(&news_path).await.unwrap();
        assert!(news.starts_with("---\ntitle: Site News\n---\n\n### March 1, 2024"));
        let mar = news.find("March 1, 2024").unwrap();
        let feb = news.find("February 1, 2024").unwrap();
        let jan = news.find("January 1, 2024").unwrap();
        assert!(mar < feb && feb < jan);
        assert!(!news.contains("December 1, 2023"));
        assert!(!news.contains("old"));

        assert_eq!(fs::read_to_string(&ann_path).await.unwrap(), ann_original);
    }

    #[tokio::test]
    async fn test_dual_category_post_written_to_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let server = mock_service(vec![item(
            "both",
            "Launch day #news #announce",
            "2024-05-01T00:00:00Z",
        )])
        .await;

        let summary = sync(cli_for(&server.uri(), dir.path(), &[])).await.unwrap();
        assert_eq!(summary.written, vec![Category::News, Category::Announcement]);

        for name in ["news.md", "announcements.md"] {
            let written = fs::read_to_string(dir.path().join(name)).await.unwrap();
            assert!(written.contains("Launch day"));
            assert!(written.contains("/post/both)"));
            assert!(!written.contains("#announce"));
        }
    }

    #[tokio::test]
    async fn test_render_failure_skips_only_that_category() {
        let dir = tempfile::tempdir().unwrap();
        let mut broken = item("x", "#news broken", "2024-05-01T00:00:00Z");
        broken["post"]["uri"] = json!("at://did:plc:alice/app.bsky.feed.like/x");
        let server = mock_service(vec![
            broken,
            item("ok", "#announcement fine", "2024-05-02T00:00:00Z"),
        ])
        .await;

        let summary = sync(cli_for(&server.uri(), dir.path(), &[])).await.unwrap();
        assert_eq!(summary.render_failed, vec![Category::News]);
        assert_eq!(summary.written, vec![Category::Announcement]);
        assert!(!summary.is_clean());
        assert!(!dir.path().join("news.md").exists());
        assert!(dir.path().join("announcements.md").exists());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let server = mock_service(vec![item("a", "#news hi", "2024-05-01T00:00:00Z")]).await;

        let summary = sync(cli_for(&server.uri(), dir.path(), &["--dry-run"]))
            .await
            .unwrap();
        assert_eq!(summary.written, vec![Category::News]);
        assert!(!dir.path().join("news.md").exists());
    }

    #[tokio::test]
    async fn test_missing_credentials_make_no_network_calls() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cli = cli_for(&server.uri(), dir.path(), &[]);
        cli.handle = None;
        assert!(matches!(sync(cli).await, Err(SyncError::Config(_))));

        let mut cli = cli_for(&server.uri(), dir.path(), &[]);
        cli.app_password = None;
        assert!(matches!(sync(cli).await, Err(SyncError::Config(_))));

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "AuthenticationRequired", "message": "Invalid identifier or password"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = sync(cli_for(&server.uri(), dir.path(), &[])).await.unwrap_err();
        assert!(matches!(err, SyncError::Auth { .. }));
        assert!(!dir.path().join("news.md").exists());
    }
}
