use super::{Node, Root, Span};

/// Validates the spans of a parsed tree against its input.
///
/// Asserts that:
/// - Every span satisfies `start <= end <= input.len()`
/// - Children lie within their parent's span
/// - Siblings are ordered and do not overlap
/// - Code bodies lie within their tag
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(input: &str, root: &Root) {
    let n = input.len();
    assert_eq!(root.span, Span::new(0, n), "root span must cover the input");
    let mut pending = vec![(root.span, root.children.as_slice())];
    while let Some((parent, children)) = pending.pop() {
        check_children(n, parent, children, &mut pending);
    }
}

fn check_children<'a>(n: usize, parent: Span, children: &'a [Node], pending: &mut Vec<(Span, &'a [Node])>) {
    let mut prev_end = parent.start;
    for child in children {
        let span = child.span();
        assert!(
            span.start <= span.end && span.end <= n,
            "{} span out of bounds: {span:?} (input len: {n})",
            child.kind()
        );
        assert!(
            span.start >= parent.start && span.end <= parent.end,
            "{} span {span:?} not contained in parent span {parent:?}",
            child.kind()
        );
        assert!(
            span.start >= prev_end,
            "{} span {span:?} overlaps previous sibling ending at {prev_end}",
            child.kind()
        );
        prev_end = span.end;

        let inner = match child {
            Node::Code(c) => Some(c.inner),
            Node::CodeIn(c) => Some(c.inner),
            _ => None,
        };
        if let Some(inner) = inner {
            assert!(
                inner.start <= inner.end && inner.start >= span.start && inner.end <= span.end,
                "{} body {inner:?} not contained in tag span {span:?}",
                child.kind()
            );
        }
        if let Some(grandchildren) = child.children() {
            pending.push((span, grandchildren));
        }
    }
}
