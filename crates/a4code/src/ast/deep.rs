//! Dropping and cloning subtrees with heap work-lists.
//!
//! Derived `Drop` and `Clone` would recurse once per nesting level, so a
//! document of a few thousand unclosed tags could exhaust the thread's stack.

use super::{Code, CodeIn, Custom, Element, Hr, Image, Link, Node, QuoteOf, Root, Text};

/// Empties `children`, releasing descendants one at a time.
pub(super) fn drop_children(children: &mut Vec<Node>) {
    let mut pending = std::mem::take(children);
    while let Some(mut node) = pending.pop() {
        if let Some(grandchildren) = node.children_mut() {
            pending.append(grandchildren);
        }
    }
}

/// `node` with its payload copied and no children.
fn shallow(node: &Node) -> Node {
    let element = |e: &Element| Element {
        span: e.span,
        children: Vec::new(),
    };
    match node {
        Node::Root(n) => Node::Root(Root {
            span: n.span,
            children: Vec::new(),
        }),
        Node::Text(n) => Node::Text(Text {
            span: n.span,
            value: n.value.clone(),
        }),
        Node::Bold(e) => Node::Bold(element(e)),
        Node::Italic(e) => Node::Italic(element(e)),
        Node::Underline(e) => Node::Underline(element(e)),
        Node::Sup(e) => Node::Sup(element(e)),
        Node::Sub(e) => Node::Sub(element(e)),
        Node::Quote(e) => Node::Quote(element(e)),
        Node::Spoiler(e) => Node::Spoiler(element(e)),
        Node::Indent(e) => Node::Indent(element(e)),
        Node::Link(n) => Node::Link(Link {
            span: n.span,
            href: n.href.clone(),
            is_block: n.is_block,
            is_immediate_close: n.is_immediate_close,
            children: Vec::new(),
        }),
        Node::Image(n) => Node::Image(Image {
            span: n.span,
            src: n.src.clone(),
        }),
        Node::Code(n) => Node::Code(Code {
            span: n.span,
            inner: n.inner,
            value: n.value.clone(),
        }),
        Node::CodeIn(n) => Node::CodeIn(CodeIn {
            span: n.span,
            inner: n.inner,
            language: n.language.clone(),
            value: n.value.clone(),
        }),
        Node::QuoteOf(n) => Node::QuoteOf(QuoteOf {
            span: n.span,
            name: n.name.clone(),
            children: Vec::new(),
        }),
        Node::Hr(n) => Node::Hr(Hr { span: n.span }),
        Node::Custom(n) => Node::Custom(Custom {
            span: n.span,
            tag: n.tag.clone(),
            children: Vec::new(),
        }),
    }
}

/// A node whose copied children are still being collected.
struct Pending<'a> {
    shell: Node,
    rest: std::slice::Iter<'a, Node>,
    copied: Vec<Node>,
}

/// Deep-copies `children`.
pub(super) fn clone_children(children: &[Node]) -> Vec<Node> {
    let mut top = Vec::with_capacity(children.len());
    let mut rest = children.iter();
    let mut stack: Vec<Pending<'_>> = Vec::new();
    loop {
        let next = match stack.last_mut() {
            Some(frame) => frame.rest.next(),
            None => rest.next(),
        };
        if let Some(node) = next {
            let source = node.children().unwrap_or_default();
            stack.push(Pending {
                shell: shallow(node),
                rest: source.iter(),
                copied: Vec::with_capacity(source.len()),
            });
            continue;
        }
        let Some(Pending { mut shell, copied, .. }) = stack.pop() else {
            return top;
        };
        if let Some(slot) = shell.children_mut() {
            *slot = copied;
        }
        match stack.last_mut() {
            Some(parent) => parent.copied.push(shell),
            None => top.push(shell),
        }
    }
}

macro_rules! deep_container {
    ($($ty:ident { $($field:ident),* }),* $(,)?) => {
        $(
            impl Drop for $ty {
                fn drop(&mut self) {
                    drop_children(&mut self.children);
                }
            }

            impl Clone for $ty {
                fn clone(&self) -> Self {
                    Self {
                        $($field: self.$field.clone(),)*
                        children: clone_children(&self.children),
                    }
                }
            }
        )*
    };
}

deep_container! {
    Root { span },
    Element { span },
    Link { span, href, is_block, is_immediate_close },
    QuoteOf { span, name },
    Custom { span, tag },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;
    use pretty_assertions::assert_eq;

    fn nested(depth: usize) -> Node {
        let mut node = Node::Text(Text::new("x"));
        for _ in 0..depth {
            node = Node::Bold(Element::new(vec![node]));
        }
        node
    }

    #[test]
    fn clone_matches_the_original() {
        let root = parse_str(r#"[b a [i b]][link http://x y][quoteof "n" [zz z]][code c]"#).unwrap();
        assert_eq!(root.clone(), root);
    }

    #[test]
    fn deep_trees_drop_and_clone_without_recursion() {
        let node = nested(500_000);
        let copy = node.clone();
        drop(node);

        let mut depth = 0;
        let mut cursor = &copy;
        while let Some([child]) = cursor.children() {
            depth += 1;
            cursor = child;
        }
        assert_eq!(depth, 500_000);
        assert!(matches!(cursor, Node::Text(t) if t.value == "x"));
    }

    #[test]
    fn dropping_children_empties_the_list() {
        let mut children = vec![nested(3), nested(2)];
        drop_children(&mut children);
        assert!(children.is_empty());
    }
}
