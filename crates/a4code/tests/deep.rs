//! Documents nested far deeper than a call stack could follow. Nothing here
//! formats a whole tree with `Debug` or compares trees with `==`, since those
//! derived impls still recurse.

use a4code::ast::{Node, invariants, transform, walk};
use a4code::convert::{A4code2Html, CodeType};
use a4code::generate::{HtmlOptions, to_goa4web_html, to_html, to_markdown, to_markup, to_text};
use a4code::quote::{QuoteOptions, full_quote_of, quote_text};
use a4code::substring::substring;
use a4code::{parse_str, stream, StreamOptions};
use pretty_assertions::assert_eq;
use std::convert::Infallible;

const DEPTH: usize = 200_000;

fn nested(open: &str, depth: usize) -> String {
    format!("{}x{}", open.repeat(depth), "]".repeat(depth))
}

fn wrapped(open: &str, inner: &str, close: &str) -> String {
    format!("{}{inner}{}", open.repeat(DEPTH), close.repeat(DEPTH))
}

#[test]
fn parse_then_drop() {
    let _ = env_logger::builder().is_test(true).try_init();
    let input = nested("[b ", DEPTH);
    let root = parse_str(&input).unwrap();
    invariants::check(&input, &root);

    let mut nodes = 0;
    walk(&Node::Root(root), |_| {
        nodes += 1;
        Ok::<_, Infallible>(())
    })
    .unwrap();
    assert_eq!(nodes, DEPTH + 2);

    let unclosed = format!("{}x", "[i ".repeat(DEPTH));
    let top: Vec<_> = stream(unclosed.as_bytes(), StreamOptions::with_depth(1))
        .collect::<a4code::Result<_>>()
        .unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].kind(), "Italic");
}

#[test]
fn every_generator_renders_deep_trees() {
    let root = parse_str(&nested("[b ", DEPTH)).unwrap();
    let plain = HtmlOptions::default().without_source_positions();

    assert_eq!(to_text(&root).unwrap(), "x");
    assert_eq!(to_markup(&root).unwrap(), nested("[b ", DEPTH));
    assert_eq!(to_markdown(&root).unwrap(), wrapped("**", "x", "**"));
    assert_eq!(to_html(&root, &plain).unwrap(), wrapped("<strong>", "x", "</strong>"));
    assert_eq!(to_goa4web_html(&root, &plain).unwrap(), wrapped("<strong>", "x", "</strong>"));

    let positioned = to_html(&root, &HtmlOptions::default()).unwrap();
    assert_eq!(positioned.matches("<strong data-start-pos=").count(), DEPTH);
    assert!(positioned.ends_with(&"</strong>".repeat(DEPTH)));
}

#[test]
fn deep_quotes_unwind_their_colors() {
    let input = format!("{}[quote y]", nested("[quote ", DEPTH));
    let root = parse_str(&input).unwrap();
    let html = to_html(&root, &HtmlOptions::default().without_source_positions()).unwrap();

    assert_eq!(html.matches("quote-color-").count(), DEPTH + 1);
    let innermost = format!("quote-color-{}", (DEPTH - 1) % 6);
    assert!(html.contains(&format!(r#"{innermost}"><div class="quote-body">x</div>"#)));
    assert!(html.ends_with(
        r#"<blockquote class="a4code-block a4code-quote quote-color-0"><div class="quote-body">y</div></blockquote>"#
    ));
}

#[test]
fn deep_trees_clone_and_transform() {
    let root = parse_str(&nested("[u ", DEPTH)).unwrap();
    let copy = root.clone();
    drop(root);
    assert_eq!(to_markup(&copy).unwrap(), nested("[u ", DEPTH));

    let emptied = transform(Node::Root(copy), &mut |node: Node| {
        Ok::<_, Infallible>(match node {
            Node::Text(_) => None,
            Node::Underline(el) if el.children.is_empty() => None,
            other => Some(other),
        })
    })
    .unwrap();
    assert!(matches!(emptied, Some(Node::Root(r)) if r.children.is_empty()));
}

#[test]
fn substring_of_deep_markup() {
    let input = nested("[b ", DEPTH);
    assert_eq!(substring(&input, 0, 1), input);
    assert_eq!(substring(&input, 1, 2), "");
}

#[test]
fn quoting_deep_replies() {
    let reply = nested(r#"[quoteof "a" x "#, DEPTH);
    let truncated = QuoteOptions::default().with_paragraphs().with_truncated_quote_depth(1);
    assert_eq!(
        quote_text("user", &reply, &truncated),
        "[quoteof \"user\" [quoteof \"a\" x [quoteof \"a\"]]]\n"
    );

    let pure = format!("{}{}", r#"[quoteof "a" "#.repeat(DEPTH), "]".repeat(DEPTH));
    assert_eq!(full_quote_of("user", &pure), "");
}

#[test]
fn single_pass_conversion_of_deep_markup() {
    let input = nested("[b ", DEPTH);
    assert_eq!(A4code2Html::new().process(&input), wrapped("<strong>", "x", "</strong>"));
    assert_eq!(
        A4code2Html::new().with_code_type(CodeType::TagStrip).process(&input),
        "x"
    );
}
