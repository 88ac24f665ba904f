//! Client for the Bluesky XRPC endpoints the sync job needs.
//!
//! Two calls are made per run, strictly in order:
//!
//! | Step | Module | Endpoint |
//! |------|--------|----------|
//! | Authenticate | [`session`] | `com.atproto.server.createSession` |
//! | Fetch posts | [`feed`] | `app.bsky.feed.getAuthorFeed` |
//!
//! Neither call is retried, paginated, or given a timeout. Non-success
//! responses are decoded from the shared `{error, message}` body.

pub mod feed;
pub mod session;
pub mod types;

use crate::error::SyncError;
use crate::utils::truncate_for_log;
use types::XrpcErrorBody;
use url::Url;

pub use feed::FeedFetcher;
pub use session::SessionClient;

/// Build the HTTP client shared by both endpoints.
pub fn http_client() -> Result<reqwest::Client, SyncError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("bsky_site_sync/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Resolve `xrpc/{method}` against the service base URL.
pub(crate) fn xrpc_url(service: &Url, method: &str) -> Result<Url, SyncError> {
    service
        .join(&format!("xrpc/{method}"))
        .map_err(|e| SyncError::Config(format!("invalid service URL {service}: {e}")))
}

/// Status, error code and message decoded from a failed XRPC response.
pub(crate) struct XrpcFailure {
    pub status: u16,
    pub code: String,
    pub message: String,
}

pub(crate) async fn read_failure(resp: reqwest::Response) -> XrpcFailure {
    let status = resp.status();
    let raw = resp.text().await.unwrap_or_default();
    let body: XrpcErrorBody = serde_json::from_str(&raw).unwrap_or_default();
    XrpcFailure {
        status: status.as_u16(),
        code: body
            .error
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string()),
        message: body.message.unwrap_or_else(|| truncate_for_log(&raw, 200)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xrpc_url_joins_method() {
        let base = Url::parse("https://bsky.social/").unwrap();
        let url = xrpc_url(&base, "app.bsky.feed.getAuthorFeed").unwrap();
        assert_eq!(
            url.as_str(),
            "https://bsky.social/xrpc/app.bsky.feed.getAuthorFeed"
        );
    }

    #[test]
    fn test_xrpc_url_keeps_base_path() {
        let base = Url::parse("http://127.0.0.1:9000/pds/").unwrap();
        let url = xrpc_url(&base, "com.atproto.server.createSession").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/pds/xrpc/com.atproto.server.createSession"
        );
    }
}
