//! Wire types for the XRPC endpoints this crate calls.
//!
//! Only the fields the sync job reads are modelled; everything else in the
//! responses is ignored by serde.

use crate::error::SyncError;
use crate::models::{Embed, ExternalLink, Image, Post, QuotedPost};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for `com.atproto.server.createSession`.
#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Success body for `com.atproto.server.createSession`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub access_jwt: String,
    pub handle: String,
    pub did: String,
}

/// Error body shared by all XRPC endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct XrpcErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Success body for `app.bsky.feed.getAuthorFeed`.
#[derive(Debug, Deserialize)]
pub struct AuthorFeedResponse {
    pub feed: Vec<FeedViewPost>,
    /// Present when older items exist. Never followed.
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
    #[serde(default)]
    pub reason: Option<ReasonView>,
}

impl FeedViewPost {
    /// Reposts appear in the author feed but were written by someone else.
    pub fn is_repost(&self) -> bool {
        self.reason
            .as_ref()
            .is_some_and(|r| r.kind == "app.bsky.feed.defs#reasonRepost")
    }
}

#[derive(Debug, Deserialize)]
pub struct ReasonView {
    #[serde(rename = "$type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct PostView {
    pub uri: String,
    pub record: PostRecord,
    /// Decoded per post so one odd embed cannot fail the whole page.
    #[serde(default)]
    pub embed: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(default)]
    pub text: Option<String>,
    /// Kept raw; parsed per post in [`parse_created_at`].
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Parse a record timestamp.
///
/// RFC 3339 is what clients are supposed to write. Timestamps without an
/// offset are read as UTC.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Hydrated embed view, discriminated by `$type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "$type")]
pub enum EmbedView {
    #[serde(rename = "app.bsky.embed.images#view")]
    Images { images: Vec<ImageView> },
    #[serde(rename = "app.bsky.embed.external#view")]
    External { external: ExternalView },
    #[serde(rename = "app.bsky.embed.record#view")]
    Record { record: RecordView },
    #[serde(rename = "app.bsky.embed.recordWithMedia#view")]
    RecordWithMedia {
        record: RecordWithMediaRecord,
        media: Box<EmbedView>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct ImageView {
    pub fullsize: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExternalView {
    pub uri: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

/// The `record` of a record embed. Not-found and blocked records carry no
/// `value`, so everything is optional.
#[derive(Debug, Deserialize)]
pub struct RecordView {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub author: Option<AuthorView>,
}

#[derive(Debug, Deserialize)]
pub struct RecordWithMediaRecord {
    pub record: RecordView,
}

#[derive(Debug, Deserialize)]
pub struct AuthorView {
    pub handle: String,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

impl RecordView {
    fn into_quote(self) -> Option<QuotedPost> {
        let text = self.value?.get("text")?.as_str()?.to_string();
        Some(QuotedPost {
            text,
            author_handle: self.author.map(|a| a.handle),
        })
    }
}

impl EmbedView {
    /// Fold this view into `embed`, recursing into quote-with-media.
    fn merge_into(self, embed: &mut Embed) {
        match self {
            EmbedView::Images { images } => {
                embed.images.extend(images.into_iter().map(|i| Image {
                    url: i.fullsize,
                    alt: non_empty(i.alt),
                }));
            }
            EmbedView::External { external } => {
                embed.external = Some(ExternalLink {
                    uri: external.uri,
                    title: non_empty(external.title),
                    description: non_empty(external.description),
                    thumbnail: non_empty(external.thumb),
                });
            }
            EmbedView::Record { record } => {
                embed.quote = record.into_quote();
            }
            EmbedView::RecordWithMedia { record, media } => {
                embed.quote = record.record.into_quote();
                media.merge_into(embed);
            }
            EmbedView::Unsupported => {}
        }
    }
}

impl TryFrom<PostView> for Post {
    type Error = SyncError;

    /// Fails with [`SyncError::Render`] when the record has no usable
    /// `createdAt` or the embed does not decode.
    fn try_from(view: PostView) -> Result<Self, Self::Error> {
        let created_at = view
            .record
            .created_at
            .as_deref()
            .and_then(parse_created_at)
            .ok_or_else(|| SyncError::render(&view.uri, "record has no valid createdAt"))?;

        let embed = match view.embed {
            None => None,
            Some(raw) => {
                let decoded: EmbedView = serde_json::from_value(raw)
                    .map_err(|e| SyncError::render(&view.uri, format!("malformed embed: {e}")))?;
                let mut embed = Embed::default();
                decoded.merge_into(&mut embed);
                (!embed.is_empty()).then_some(embed)
            }
        };

        Ok(Post {
            uri: view.uri,
            text: view.record.text,
            created_at,
            embed,
        })
    }
}
