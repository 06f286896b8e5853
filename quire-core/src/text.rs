//! Small text and date helpers used by listing and profile pages

use chrono::{DateTime, Utc};

/// Words shown in a post excerpt on listing pages
pub const EXCERPT_WORDS: usize = 30;

/// First `max_words` whitespace-separated words of `content`, with `...`
/// appended when anything was cut.
pub fn excerpt(content: &str, max_words: usize) -> String {
    let mut words = content.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(max_words).collect();

    let mut out = kept.join(" ");
    if words.next().is_some() {
        out.push_str(" ...");
    }
    out
}

/// Whole calendar days between joining and `now` (UTC dates).
pub fn days_since(joined: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now.date_naive() - joined.date_naive()).num_days().max(0)
}
