//! Markdown rendering of ranked posts.
//!
//! Each post becomes a block of the form:
//!
//! ```text
//! ### January 5, 2024
//!
//! Post text with hashtag markers removed
//!
//! <img src="…" alt="…" />            (embed fragment, or bare link lines)
//!
//! [View on Bluesky](https://bsky.app/profile/alice.bsky.social/post/3kabc)
//!
//! ---
//! ```
//!
//! Media and link cards are emitted as inline HTML so the static site renders
//! them without extra shortcodes. Post and quote text is HTML-escaped, and
//! only `http`/`https` urls are ever placed in `href` or `src`.

use crate::error::SyncError;
use crate::models::{Embed, ExternalLink, Image, Post, QuotedPost};
use crate::utils::{long_date, normalize_handle};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, instrument};
use url::Url;

/// A marker must not be glued to a preceding word or `#`, nor followed by a
/// word character or `-`. Both neighbours are captured and put back.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(^|[^\w#])#(?:announcement|announce|news)($|[^\w-])")
        .expect("valid marker regex")
});
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("valid url regex"));

const DEFAULT_ALT: &str = "Image";
const DEFAULT_LINK_TITLE: &str = "External Link";
const POST_COLLECTION: &str = "app.bsky.feed.post";

/// Render a ranked selection into a document body.
///
/// The first post that cannot be rendered aborts the whole selection; the
/// offending post uri is logged and carried in the error.
#[instrument(level = "info", skip(selection), fields(posts = selection.len()))]
pub fn render(selection: &[&Post], author_handle: &str) -> Result<String, SyncError> {
    let handle = normalize_handle(author_handle);
    let mut blocks = Vec::with_capacity(selection.len());
    for post in selection {
        match render_post(post, handle) {
            Ok(block) => blocks.push(block),
            Err(e) => {
                error!(uri = %post.uri, error = %e, "Failed to render post");
                return Err(e);
            }
        }
    }
    Ok(blocks.join("\n\n"))
}

/// Render a single post block, ending in a horizontal rule.
pub fn render_post(post: &Post, handle: &str) -> Result<String, SyncError> {
    let raw = post
        .text
        .as_deref()
        .ok_or_else(|| SyncError::render(&post.uri, "record has no text field"))?;
    let rkey = post_rkey(&post.uri)?;

    let mut sections = vec![format!("### {}", long_date(&post.created_at))];

    let cleaned = strip_markers(raw);
    if !cleaned.is_empty() {
        sections.push(text(&cleaned).into_owned());
    }

    match post.embed.as_ref() {
        Some(embed) if post.has_embed() => sections.push(render_embed(embed)),
        _ => {
            let links = link_lines(&cleaned);
            if !links.is_empty() {
                sections.push(links.join("\n"));
            }
        }
    }

    sections.push(format!(
        "[View on Bluesky](https://bsky.app/profile/{handle}/post/{rkey})"
    ));
    sections.push("---".to_string());

    debug!(uri = %post.uri, "Rendered post");
    Ok(sections.join("\n\n"))
}

/// Remove category markers and tidy the whitespace they leave behind.
///
/// Markers are removed only as whole words, so `#newsletter` and
/// `#news-worthy` survive while `(#news)` and `done.#announce` do not. Runs
/// of spaces on each line collapse to one and the result is trimmed.
pub fn strip_markers(raw: &str) -> String {
    // Adjacent markers share a separator, so one pass can miss the second.
    let mut removed = raw.to_string();
    while MARKER_RE.is_match(&removed) {
        removed = MARKER_RE.replace_all(&removed, "${1}${2}").into_owned();
    }
    removed
        .lines()
        .map(|line| SPACE_RUN_RE.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Record key of an `at://{authority}/app.bsky.feed.post/{rkey}` uri.
pub fn post_rkey(uri: &str) -> Result<&str, SyncError> {
    let malformed = || SyncError::render(uri, "malformed post uri");
    let rest = uri.strip_prefix("at://").ok_or_else(malformed)?;
    let mut parts = rest.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(authority), Some(POST_COLLECTION), Some(rkey), None)
            if !authority.is_empty() && !rkey.is_empty() =>
        {
            Ok(rkey)
        }
        _ => Err(malformed()),
    }
}

/// Bare URLs in `text` as labelled link lines, in order of appearance.
pub fn link_lines(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', ')']))
        .filter(|url| !url.is_empty())
        .map(|url| format!("[🔗 Link]({url})"))
        .collect()
}

/// True for absolute `http`/`https` urls.
pub fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// All embed kinds present, in the order images, link card, quote.
pub fn render_embed(embed: &Embed) -> String {
    let mut parts = Vec::new();
    let images: Vec<_> = embed
        .images
        .iter()
        .filter(|image| is_web_url(&image.url))
        .map(render_image)
        .collect();
    if !images.is_empty() {
        parts.push(images.join("\n"));
    }
    if let Some(external) = &embed.external {
        parts.push(render_external(external));
    }
    if let Some(quote) = &embed.quote {
        parts.push(render_quote(quote));
    }
    parts.join("\n\n")
}

fn render_image(image: &Image) -> String {
    format!(
        r#"<img src="{}" alt="{}" style="max-width: 100%; border-radius: 8px;" />"#,
        attr(&image.url),
        attr(image.alt.as_deref().unwrap_or(DEFAULT_ALT))
    )
}

fn render_external(link: &ExternalLink) -> String {
    let title = link.title.as_deref().unwrap_or(DEFAULT_LINK_TITLE);
    let mut card = vec![
        r#"<div class="external-link" style="border: 1px solid #ddd; border-radius: 8px; padding: 12px; margin: 12px 0;">"#
            .to_string(),
    ];
    if let Some(thumb) = link.thumbnail.as_deref().filter(|t| is_web_url(t)) {
        card.push(format!(
            r#"<img src="{}" alt="{}" style="max-width: 100%; border-radius: 4px;" />"#,
            attr(thumb),
            attr(title)
        ));
    }
    if is_web_url(&link.uri) {
        card.push(format!(
            r#"<a href="{}"><strong>{}</strong></a>"#,
            attr(&link.uri),
            text(title)
        ));
    } else {
        card.push(format!("<strong>{}</strong>", text(title)));
    }
    if let Some(description) = &link.description {
        card.push(format!("<p>{}</p>", text(description)));
    }
    card.push("</div>".to_string());
    card.join("\n")
}

fn render_quote(quote: &QuotedPost) -> String {
    let mut lines = Vec::new();
    if let Some(handle) = &quote.author_handle {
        lines.push(format!("> **@{}**", normalize_handle(handle)));
        lines.push(">".to_string());
    }
    for line in quote.text.lines() {
        if line.trim().is_empty() {
            lines.push(">".to_string());
        } else {
            lines.push(format!("> {}", text(line)));
        }
    }
    lines.join("\n")
}
