//! Building `[quoteof …]` replies.
//!
//! ```
//! use a4code::quote::{QuoteOptions, quote_text};
//!
//! let reply = quote_text("bob", "foo\n\nbar", &QuoteOptions::default().with_paragraphs());
//! assert_eq!(reply, "[quoteof \"bob\" foo]\n[quoteof \"bob\" bar]\n");
//! ```

use crate::ast::{Node, QuoteOf};
use crate::generate::{quoted, to_markup};
use crate::parser::parse_str;
use crate::scanner::into_string;

/// How [`quote_text`] wraps text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteOptions {
    paragraphs: bool,
    trim: bool,
    restricted_quote_depth: Option<usize>,
    truncated_quote_depth: Option<usize>,
}

impl QuoteOptions {
    /// Quotes each paragraph separately. See [`full_quote_of`].
    pub fn with_paragraphs(mut self) -> Self {
        self.paragraphs = true;
        self
    }

    /// Strips surrounding whitespace from the text and from each paragraph.
    pub fn with_trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// In paragraph mode, keeps a paragraph made only of nested quotes when
    /// its nesting is at most `depth`. Without this, such paragraphs are
    /// always dropped.
    pub fn with_restricted_quote_depth(mut self, depth: usize) -> Self {
        self.restricted_quote_depth = Some(depth);
        self
    }

    /// In paragraph mode, empties quotes nested deeper than `depth` inside a
    /// quoted paragraph.
    pub fn with_truncated_quote_depth(mut self, depth: usize) -> Self {
        self.truncated_quote_depth = Some(depth);
        self
    }
}

/// Wraps `text` in a quote attributed to `user`.
pub fn quote_text(user: &str, text: &str, options: &QuoteOptions) -> String {
    if options.paragraphs {
        return paragraph_quotes(user, text, options);
    }
    wrap(user, text, options.trim)
}

/// `[quoteof "user" text]` followed by a newline.
pub fn quote_of_text(user: &str, text: &str) -> String {
    wrap(user, text, false)
}

/// Quotes each paragraph of `text` in its own `[quoteof …]` line.
///
/// Paragraphs are separated by blank lines outside any open bracket. `\[` and
/// `\]` become bare brackets, and paragraphs that only quote other quotes are
/// left out.
pub fn full_quote_of(user: &str, text: &str) -> String {
    quote_text(user, text, &QuoteOptions::default().with_paragraphs())
}

fn wrap(user: &str, text: &str, trim: bool) -> String {
    let text = if trim { text.trim() } else { text };
    format!("[quoteof {} {text}]\n", quoted(user))
}

fn paragraph_quotes(user: &str, text: &str, options: &QuoteOptions) -> String {
    let text = if options.trim { text.trim() } else { text };
    split_paragraphs(text)
        .iter()
        .filter_map(|block| process_block(block, options))
        .map(|block| wrap(user, &block, options.trim))
        .collect()
}

/// Splits text on blank lines outside brackets. Line breaks inside a
/// paragraph collapse to a single `\n` and carriage returns are dropped.
fn split_paragraphs(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();
    let mut out = Vec::new();
    let mut depth = 0isize;
    let mut newlines = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        i += 1;
        match b {
            b'\n' => {
                if depth <= 0 && newlines == 1 {
                    blocks.push(into_string(std::mem::take(&mut out)));
                }
                newlines += 1;
                continue;
            }
            b'\r' => continue,
            _ => {}
        }
        if newlines != 0 {
            if !out.is_empty() {
                out.push(b'\n');
            }
            newlines = 0;
        }
        match b {
            b'[' => depth += 1,
            b']' => depth -= 1,
            b'\\' => match bytes.get(i) {
                Some(&n @ (b'[' | b']')) => {
                    out.push(n);
                    i += 1;
                    continue;
                }
                Some(b'\\') => {
                    out.extend_from_slice(b"\\\\");
                    i += 1;
                    continue;
                }
                _ => {}
            },
            _ => {}
        }
        out.push(b);
    }
    blocks.push(into_string(out));
    blocks
}

/// Decides whether a paragraph is quoted, possibly rewriting it.
fn process_block(block: &str, options: &QuoteOptions) -> Option<String> {
    let trimmed = block.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !is_quote_block(trimmed) {
        return Some(block.to_string());
    }
    let Ok(mut root) = parse_str(trimmed) else {
        return Some(block.to_string());
    };
    let [Node::QuoteOf(quote)] = root.children.as_slice() else {
        return Some(block.to_string());
    };

    if is_pure_quote(&quote.children) {
        let depth = pure_quote_depth(&quote.children);
        if options.restricted_quote_depth.is_none_or(|limit| depth > limit) {
            log::debug!("dropping quote-of-quote paragraph nested {depth} deep");
            return None;
        }
    }

    let Some(limit) = options.truncated_quote_depth else {
        return Some(block.to_string());
    };
    if !truncate_quotes(&mut root.children, limit) {
        return Some(block.to_string());
    }
    Some(to_markup(&root).unwrap_or_else(|_| block.to_string()))
}

/// True when `s` is one `[quoteof …]` tag and nothing else.
fn is_quote_block(s: &str) -> bool {
    let s = s.trim();
    if !s.get(..8).is_some_and(|head| head.eq_ignore_ascii_case("[quoteof")) {
        return false;
    }
    let mut depth = 0isize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return i == s.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Children made only of quotes and whitespace, with at least one quote.
fn is_pure_quote(children: &[Node]) -> bool {
    let mut has_quote = false;
    for child in children {
        match child {
            Node::QuoteOf(_) => has_quote = true,
            Node::Text(t) if t.value.trim().is_empty() => {}
            _ => return false,
        }
    }
    has_quote
}

/// How many quotes deep a chain of pure quotes goes.
fn pure_quote_depth(children: &[Node]) -> usize {
    let mut best = 0;
    let mut pending = vec![(children, 1)];
    while let Some((children, level)) = pending.pop() {
        for child in children {
            if let Node::QuoteOf(q) = child {
                best = best.max(level);
                if is_pure_quote(&q.children) {
                    pending.push((&q.children, level + 1));
                }
            }
        }
    }
    best
}

/// Empties quotes nested more than `limit` deep. Returns whether anything
/// was removed.
fn truncate_quotes(children: &mut [Node], limit: usize) -> bool {
    let mut cleared = false;
    let mut pending = vec![(children, 0)];
    while let Some((children, depth)) = pending.pop() {
        for child in children {
            let Node::QuoteOf(QuoteOf { children, .. }) = child else {
                continue;
            };
            if depth + 1 > limit {
                cleared |= !children.is_empty();
                children.clear();
            } else {
                pending.push((children.as_mut_slice(), depth + 1));
            }
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn wraps_text() {
        let got = quote_of_text("bob", "hello");
        assert_eq!(got, "[quoteof \"bob\" hello]\n");

        let root = parse_str(&got).unwrap();
        let Node::QuoteOf(q) = &root.children[0] else {
            panic!("expected quoteof, got {:?}", root.children[0]);
        };
        assert_eq!(q.name, "bob");
        let Node::Text(t) = &q.children[0] else {
            panic!("expected text");
        };
        assert_eq!(t.value, "hello");
    }

    #[test]
    fn trims_when_asked() {
        assert_eq!(
            quote_text("bob", " hello \n", &QuoteOptions::default().with_trim()),
            "[quoteof \"bob\" hello]\n"
        );
    }

    #[rstest]
    #[case("Arran on messenger")]
    #[case(r#"Arran "The Man" on messenger"#)]
    #[case(r#"Foo "Bar" Baz \ Quux"#)]
    fn names_round_trip(#[case] name: &str) {
        let root = parse_str(&quote_of_text(name, "some content")).unwrap();
        let Node::QuoteOf(q) = &root.children[0] else {
            panic!("expected quoteof");
        };
        assert_eq!(q.name, name);
    }

    #[test]
    fn paragraphs_are_quoted_separately() {
        let got = full_quote_of("bob", "foo\n\nbar");
        assert_eq!(got, "[quoteof \"bob\" foo]\n[quoteof \"bob\" bar]\n");

        let root = parse_str(&got).unwrap();
        let quotes: Vec<_> = root.children.iter().filter(|n| matches!(n, Node::QuoteOf(_))).collect();
        assert_eq!(quotes.len(), 2);
    }

    #[test]
    fn escaped_brackets_become_markup() {
        let got = full_quote_of("bob", r"see \[bracket\]");
        assert_eq!(got, "[quoteof \"bob\" see [bracket]]\n");
        let root = parse_str(&got).unwrap();
        let Node::QuoteOf(q) = &root.children[0] else {
            panic!("expected quoteof");
        };
        assert_eq!(q.children.len(), 2);
        assert!(matches!(&q.children[1], Node::Custom(c) if c.tag == "bracket"));
    }

    #[test]
    fn images_stay_images() {
        let got = full_quote_of("bob", "[img http://example.com/foo.jpg]");
        assert_eq!(got, "[quoteof \"bob\" [img http://example.com/foo.jpg]]\n");
        let root = parse_str(&got).unwrap();
        let Node::QuoteOf(q) = &root.children[0] else {
            panic!("expected quoteof");
        };
        assert!(matches!(q.children[0], Node::Image(_)));
    }

    #[rstest]
    #[case("Para 1\n\n[quoteof \"other\" inner]\n\nPara 2", "[quoteof \"user\" Para 1]\n[quoteof \"user\" [quoteof \"other\" inner]]\n[quoteof \"user\" Para 2]\n")]
    #[case("Para 1\n\n[quoteof \"other\" [quoteof \"inner\" content]]\n\nPara 2", "[quoteof \"user\" Para 1]\n[quoteof \"user\" Para 2]\n")]
    #[case("Para 1\n\n\nPara 2", "[quoteof \"user\" Para 1]\n[quoteof \"user\" Para 2]\n")]
    #[case("line 1\nline 2", "[quoteof \"user\" line 1\nline 2]\n")]
    #[case("Para 1\n\n[b bold]", "[quoteof \"user\" Para 1]\n[quoteof \"user\" [b bold]]\n")]
    #[case("[b open\n\nstill open]\n\nnext", "[quoteof \"user\" [b open\nstill open]]\n[quoteof \"user\" next]\n")]
    #[case("[quoteof \"other\" inner] and more", "[quoteof \"user\" [quoteof \"other\" inner] and more]\n")]
    #[case("", "")]
    #[case("   \t   ", "")]
    #[case("\n\n\n", "")]
    #[case("Prefix [quoteof \"other\" inner]", "[quoteof \"user\" Prefix [quoteof \"other\" inner]]\n")]
    #[case("[quoteof \"A\" 1] [quoteof \"B\" 2]", "[quoteof \"user\" [quoteof \"A\" 1] [quoteof \"B\" 2]]\n")]
    #[case("[QUOTEOF \"other\" inner]", "[quoteof \"user\" [QUOTEOF \"other\" inner]]\n")]
    #[case("]\n\nNext", "[quoteof \"user\" ]]\n[quoteof \"user\" Next]\n")]
    #[case("\\[\n\nNext", "[quoteof \"user\" []\n[quoteof \"user\" Next]\n")]
    #[case("a\\b \\\\[x]", "[quoteof \"user\" a\\b \\\\[x]]\n")]
    #[case("crlf\r\n\r\nnext", "[quoteof \"user\" crlf]\n[quoteof \"user\" next]\n")]
    fn paragraph_mode(#[case] input: &str, #[case] want: &str) {
        assert_eq!(full_quote_of("user", input), want);
    }

    #[rstest]
    #[case("[quoteof \"A\" [quoteof \"B\" content]]", Some(0), None, "")]
    #[case("[quoteof \"A\" content]", Some(0), None, "[quoteof \"user\" [quoteof \"A\" content]]\n")]
    #[case("[quoteof \"A\" [quoteof \"B\" content]]", Some(1), None, "[quoteof \"user\" [quoteof \"A\" [quoteof \"B\" content]]]\n")]
    #[case("[quoteof \"A\" [quoteof \"B\" [quoteof \"C\" content]]]", Some(1), None, "")]
    #[case("[quoteof \"A\" content] and more text", Some(0), None, "[quoteof \"user\" [quoteof \"A\" content] and more text]\n")]
    #[case("[quoteof \"A\" content]", None, Some(0), "[quoteof \"user\" [quoteof \"A\"]]\n")]
    #[case("[quoteof \"A\" [quoteof \"B\" content]]", Some(2), Some(1), "[quoteof \"user\" [quoteof \"A\" [quoteof \"B\"]]]\n")]
    #[case("[quoteof \"A\" content]", None, Some(1), "[quoteof \"user\" [quoteof \"A\" content]]\n")]
    #[case("[quoteof \"A\" [quoteof \"B\" [quoteof \"C\" content]]]", Some(2), Some(1), "[quoteof \"user\" [quoteof \"A\" [quoteof \"B\"]]]\n")]
    #[case("[quoteof \"A\" [link x]]", None, Some(1), "[quoteof \"user\" [quoteof \"A\" [link x]]]\n")]
    #[case("[quoteof=A [url=http://x y] \\*z]", None, Some(3), "[quoteof \"user\" [quoteof=A [url=http://x y] \\*z]]\n")]
    #[case("[quoteof \"A\" [quoteof \"B\"] [link x]]", None, Some(1), "[quoteof \"user\" [quoteof \"A\" [quoteof \"B\"] [link x]]]\n")]
    #[case("[quoteof \"A\" [link x] [quoteof \"B\" y]]", None, Some(1), "[quoteof \"user\" [quoteof \"A\" [a=x] [quoteof \"B\"]]]\n")]
    fn depth_limits(
        #[case] input: &str,
        #[case] restricted: Option<usize>,
        #[case] truncated: Option<usize>,
        #[case] want: &str,
    ) {
        let mut options = QuoteOptions::default().with_paragraphs();
        if let Some(depth) = restricted {
            options = options.with_restricted_quote_depth(depth);
        }
        if let Some(depth) = truncated {
            options = options.with_truncated_quote_depth(depth);
        }
        assert_eq!(quote_text("user", input, &options), want);
    }

    #[rstest]
    #[case("[quoteof \"a\" x]", true)]
    #[case("  [QuoteOf \"a\" [b x]]  ", true)]
    #[case("[quoteof \"a\" x] tail", false)]
    #[case("[quoteof \"a\" x", false)]
    #[case("[quote x]", false)]
    fn quote_blocks(#[case] input: &str, #[case] want: bool) {
        assert_eq!(is_quote_block(input), want);
    }

    #[test]
    fn truncation_reports_whether_it_removed_anything() {
        let mut root = parse_str(r#"[quoteof "A" [quoteof "B"] x]"#).unwrap();
        assert!(!truncate_quotes(&mut root.children, 1));
        assert!(!truncate_quotes(&mut root.children, 5));
        let mut root = parse_str(r#"[quoteof "A" [quoteof "B" y] x]"#).unwrap();
        assert!(truncate_quotes(&mut root.children, 1));
        assert!(!truncate_quotes(&mut root.children, 1));
    }

    #[test]
    fn deep_quotes_truncate_without_recursion() {
        let n = 200_000;
        let text = format!("{}{}", r#"[quoteof "a" x "#.repeat(n), "]".repeat(n));
        let options = QuoteOptions::default().with_paragraphs().with_truncated_quote_depth(1);
        assert_eq!(
            quote_text("user", &text, &options),
            "[quoteof \"user\" [quoteof \"a\" x [quoteof \"a\"]]]\n"
        );

        let pure = format!("{}{}", r#"[quoteof "a" "#.repeat(n), "]".repeat(n));
        let root = parse_str(&pure).unwrap();
        assert_eq!(pure_quote_depth(&root.children), n);
    }
}
