//! Cutting a range of visible text out of markup.
//!
//! Offsets count bytes of visible text, as if every tag were stripped. The
//! markup around the kept text survives:
//!
//! ```
//! assert_eq!(a4code::substring::substring("hello [b world]", 2, 8), "llo [b wo]");
//! ```

use std::convert::Infallible;

use crate::ast::{Node, Root, transform};
use crate::error::Result;
use crate::generate::to_markup;
use crate::parser::parse_str;

/// Returns canonical markup for the visible-text bytes `[start, end)` of
/// `markup`.
///
/// Text and code bodies are cut to the range, images and rules are kept when
/// their position falls inside it, and containers left empty are dropped. Cuts
/// inside a multi-byte character widen to include the whole character.
///
/// If the markup cannot be processed the raw input is sliced instead, which
/// does not respect tag boundaries.
pub fn substring(markup: &str, start: usize, end: usize) -> String {
    match cut(markup, start, end) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("substring fell back to raw slicing: {e}");
            raw_slice(markup, start, end).to_string()
        }
    }
}

fn cut(markup: &str, start: usize, end: usize) -> Result<String> {
    let root = parse_str(markup)?;
    let mut pos = 0;
    let kept = transform(Node::Root(root), &mut |node| {
        Ok::<_, Infallible>(keep_visible(node, start, end, &mut pos))
    });
    let root = match kept {
        Ok(Some(Node::Root(root))) => root,
        _ => Root::default(),
    };
    to_markup(&root)
}

/// Filters one node whose children are already filtered. `pos` is the
/// visible offset reached so far.
fn keep_visible(node: Node, start: usize, end: usize, pos: &mut usize) -> Option<Node> {
    match node {
        Node::Root(_) => Some(node),
        Node::Text(mut n) => {
            n.value = take(&n.value, start, end, pos)?;
            Some(Node::Text(n))
        }
        Node::Code(mut n) => {
            n.value = take(&n.value, start, end, pos)?;
            Some(Node::Code(n))
        }
        Node::CodeIn(mut n) => {
            n.value = take(&n.value, start, end, pos)?;
            Some(Node::CodeIn(n))
        }
        Node::Image(_) | Node::Hr(_) => (start <= *pos && *pos < end).then_some(node),
        _ => node.children().is_some_and(|c| !c.is_empty()).then_some(node),
    }
}

/// Advances `pos` past `value` and returns the part of it inside the range.
fn take(value: &str, start: usize, end: usize, pos: &mut usize) -> Option<String> {
    let from = *pos;
    *pos += value.len();
    let lo = start.max(from) - from;
    let hi = end.min(*pos).saturating_sub(from);
    (lo < hi).then(|| char_slice(value, lo, hi).to_string())
}

/// Slices `s`, widening to the nearest character boundaries.
fn char_slice(s: &str, mut lo: usize, mut hi: usize) -> &str {
    while !s.is_char_boundary(lo) {
        lo -= 1;
    }
    while !s.is_char_boundary(hi) {
        hi += 1;
    }
    &s[lo..hi]
}

fn raw_slice(s: &str, start: usize, end: usize) -> &str {
    let end = end.min(s.len());
    char_slice(s, start.min(end), end)
}
