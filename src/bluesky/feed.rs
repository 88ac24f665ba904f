//! Author feed retrieval via `app.bsky.feed.getAuthorFeed`.

use super::types::AuthorFeedResponse;
use super::{read_failure, xrpc_url};
use crate::error::SyncError;
use crate::models::{Credential, Post};
use crate::utils::normalize_handle;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Default page size requested from the service.
pub const DEFAULT_LIMIT: u8 = 50;
/// Largest page size the service accepts.
pub const MAX_LIMIT: u8 = 100;

/// Fetches one bounded page of an author's recent posts.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    http: reqwest::Client,
    service: Url,
}

impl FeedFetcher {
    pub fn new(http: reqwest::Client, service: Url) -> Self {
        Self { http, service }
    }

    /// Fetch up to `limit` posts authored by `actor`.
    ///
    /// Exactly one request is made; a `cursor` in the response is ignored, so
    /// anything older than the first page is dropped. Posts keep the order the
    /// service returned them in. Reposts of other authors are skipped, and a
    /// post whose timestamp or embed cannot be decoded is dropped with a
    /// warning rather than failing the page.
    #[instrument(level = "info", skip(self, credential))]
    pub async fn fetch_recent_posts(
        &self,
        credential: &Credential,
        actor: &str,
        limit: u8,
    ) -> Result<Vec<Post>, SyncError> {
        let limit = limit.clamp(1, MAX_LIMIT);
        let mut url = xrpc_url(&self.service, "app.bsky.feed.getAuthorFeed")?;
        url.query_pairs_mut()
            .append_pair("actor", normalize_handle(actor))
            .append_pair("limit", &limit.to_string());

        let resp = self
            .http
            .get(url)
            .bearer_auth(&credential.access_jwt)
            .send()
            .await?;

        if !resp.status().is_success() {
            let failure = read_failure(resp).await;
            error!(
                status = failure.status,
                code = %failure.code,
                message = %failure.message,
                "Author feed request failed"
            );
            return Err(SyncError::Fetch {
                status: failure.status,
                code: failure.code,
                message: failure.message,
            });
        }

        let page: AuthorFeedResponse = resp.json().await?;
        if page.cursor.is_some() {
            debug!("More posts available; only the first page is used");
        }

        let total = page.feed.len();
        let mut reposts = 0usize;
        let mut malformed = 0usize;
        let mut posts = Vec::with_capacity(total);
        for item in page.feed {
            if item.is_repost() {
                reposts += 1;
                continue;
            }
            let uri = item.post.uri.clone();
            match Post::try_from(item.post) {
                Ok(post) => posts.push(post),
                Err(e) => {
                    warn!(%uri, error = %e, "Dropping malformed post");
                    malformed += 1;
                }
            }
        }

        info!(
            count = posts.len(),
            reposts_skipped = reposts,
            malformed_dropped = malformed,
            "Fetched author feed"
        );
        Ok(posts)
    }
}
