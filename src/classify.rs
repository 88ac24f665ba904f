//! Hashtag-based routing of posts into output categories.
//!
//! Matching is a case-insensitive substring search for each category's
//! markers anywhere in the post text, so `#Newsletter` also counts as
//! `#news`. A post that carries markers from more than one category is
//! routed into all of them.

use crate::models::{Category, Post};
use itertools::Itertools;
use std::collections::BTreeSet;

/// Number of posts kept per category.
pub const DEFAULT_MAX_POSTS: usize = 3;

/// Categories whose markers appear in `text`.
pub fn classify_text(text: &str) -> BTreeSet<Category> {
    let lower = text.to_lowercase();
    Category::ALL
        .into_iter()
        .filter(|c| c.markers().iter().any(|m| lower.contains(m)))
        .collect()
}

/// Categories `post` belongs to. Empty when no marker matches.
pub fn classify(post: &Post) -> BTreeSet<Category> {
    classify_text(post.text_or_empty())
}

/// Posts in `category`, newest first, at most `max` of them.
///
/// The sort is stable, so posts sharing a timestamp keep feed order.
pub fn rank_selection(posts: &[Post], category: Category, max: usize) -> Vec<&Post> {
    posts
        .iter()
        .filter(|p| classify(p).contains(&category))
        .sorted_by(|a, b| b.created_at.cmp(&a.created_at))
        .take(max)
        .collect()
}
