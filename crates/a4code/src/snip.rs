//! Shortening the plain text of a post for previews.

use crate::generate::to_text;
use crate::parser::parse_str;

const ELLIPSIS: &str = "...";

/// Strips markup from `markup` and cuts the text to at most `max_chars`
/// characters, trimming trailing whitespace and appending `...` when anything
/// was cut.
///
/// ```
/// assert_eq!(a4code::snip::snip("[b This] is a long string", 10), "This is a...");
/// assert_eq!(a4code::snip::snip("short", 10), "short");
/// ```
pub fn snip(markup: &str, max_chars: usize) -> String {
    let text = plain_text(markup);
    if text.chars().count() <= max_chars {
        return text;
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}{ELLIPSIS}", head.trim_end())
}

/// Strips markup from `markup` and keeps its first `max_words` words, joined by
/// single spaces and followed by `...` when anything was cut.
pub fn snip_words(markup: &str, max_words: usize) -> String {
    let text = plain_text(markup);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text;
    }
    format!("{}{ELLIPSIS}", words[..max_words].join(" "))
}

fn plain_text(markup: &str) -> String {
    parse_str(markup)
        .and_then(|root| to_text(&root))
        .unwrap_or_else(|e| {
            log::warn!("snip used raw markup: {e}");
            markup.to_string()
        })
}
