//! Domain models for posts and their output categories.
//!
//! This module defines the data that flows through a sync run:
//! - [`Credential`]: session token obtained once per run
//! - [`Post`]: one post from the author feed, immutable once fetched
//! - [`Embed`]: media and link data attached to a post
//! - [`Category`]: the output bucket a post is routed into
//!
//! Wire-format types for the remote service live in [`crate::bluesky::types`]
//! and are converted into these models at the fetch boundary.

use chrono::{DateTime, Utc};
use std::fmt;

/// Access credential for the remote service.
///
/// Lives for a single run and is never persisted. `Debug` is implemented by
/// hand so the bearer token never reaches a log line.
#[derive(Clone)]
pub struct Credential {
    /// Bearer token sent on authenticated requests.
    pub access_jwt: String,
    /// Handle the session was created for.
    pub handle: String,
    /// Decentralized identifier of the account.
    pub did: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_jwt", &"<redacted>")
            .field("handle", &self.handle)
            .field("did", &self.did)
            .finish()
    }
}

/// A single post from the author feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// `at://` URI identifying the post record.
    pub uri: String,
    /// Post text. `None` when the record carried no text field.
    pub text: Option<String>,
    /// Creation timestamp as recorded by the author's client.
    pub created_at: DateTime<Utc>,
    /// Attached media or link data.
    pub embed: Option<Embed>,
}

impl Post {
    /// Text used for classification; a missing text field reads as empty.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether any embed kind is attached.
    pub fn has_embed(&self) -> bool {
        self.embed.as_ref().is_some_and(|e| !e.is_empty())
    }
}

/// Embedded content attached to a post.
///
/// A post usually carries one kind, but a quote-with-media post carries a
/// quoted record alongside images or a link card, so every kind is held
/// independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embed {
    pub images: Vec<Image>,
    pub external: Option<ExternalLink>,
    pub quote: Option<QuotedPost>,
}

impl Embed {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.external.is_none() && self.quote.is_none()
    }
}

/// One image from an image set.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: String,
    pub alt: Option<String>,
}

/// An external link card.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalLink {
    pub uri: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

/// A quoted post nested inside another post.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotedPost {
    pub text: String,
    pub author_handle: Option<String>,
}

/// Output category a post may be routed into.
///
/// Classification is non-exclusive: one post can land in several categories,
/// so classifiers return a set of these rather than a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    News,
    Announcement,
}

impl Category {
    /// Processing order for a run.
    pub const ALL: [Category; 2] = [Category::News, Category::Announcement];

    /// Title used for a synthesized metadata block.
    pub fn title(self) -> &'static str {
        match self {
            Category::News => "News",
            Category::Announcement => "Announcements",
        }
    }

    /// Hashtag markers that route a post into this category.
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            Category::News => &["#news"],
            Category::Announcement => &["#announcement", "#announce"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::News => f.write_str("news"),
            Category::Announcement => f.write_str("announcement"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: Option<&str>, embed: Option<Embed>) -> Post {
        Post {
            uri: "at://did:plc:abc/app.bsky.feed.post/3k".to_string(),
            text: text.map(str::to_string),
            created_at: "2024-01-05T12:00:00Z".parse().unwrap(),
            embed,
        }
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let cred = Credential {
            access_jwt: "secret-token".to_string(),
            handle: "alice.bsky.social".to_string(),
            did: "did:plc:abc".to_string(),
        };
        let dbg = format!("{:?}", cred);
        assert!(!dbg.contains("secret-token"));
        assert!(dbg.contains("alice.bsky.social"));
    }

    #[test]
    fn test_text_or_empty() {
        assert_eq!(post(None, None).text_or_empty(), "");
        assert_eq!(post(Some("hi"), None).text_or_empty(), "hi");
    }

    #[test]
    fn test_has_embed_ignores_empty_embed() {
        assert!(!post(Some("x"), Some(Embed::default())).has_embed());
        let embed = Embed {
            quote: Some(QuotedPost {
                text: "quoted".to_string(),
                author_handle: None,
            }),
            ..Embed::default()
        };
        assert!(post(Some("x"), Some(embed)).has_embed());
    }

    #[test]
    fn test_category_order_and_display() {
        assert_eq!(Category::ALL, [Category::News, Category::Announcement]);
        assert_eq!(Category::News.to_string(), "news");
        assert_eq!(Category::Announcement.title(), "Announcements");
        assert!(Category::Announcement.markers().contains(&"#announce"));
    }
}
