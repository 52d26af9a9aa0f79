use std::fmt::Write;

use super::Node;

/// Renders an indented outline of a tree, one node per line.
///
/// ```text
/// Root@0..12
///   Link@0..12 href="http://x" block immediate
/// ```
pub fn dump(node: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![(node, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let span = node.span();
        let _ = write!(out, "{:indent$}{}@{}..{}", "", node.kind(), span.start, span.end, indent = depth * 2);
        match node {
            Node::Text(t) => {
                let _ = write!(out, " {:?}", t.value);
            }
            Node::Link(l) => {
                let _ = write!(out, " href={:?}", l.href);
                if l.is_block {
                    out.push_str(" block");
                }
                if l.is_immediate_close {
                    out.push_str(" immediate");
                }
            }
            Node::Image(i) => {
                let _ = write!(out, " src={:?}", i.src);
            }
            Node::Code(c) => {
                let _ = write!(out, " inner={}..{} {:?}", c.inner.start, c.inner.end, c.value);
            }
            Node::CodeIn(c) => {
                let _ = write!(
                    out,
                    " language={:?} inner={}..{} {:?}",
                    c.language, c.inner.start, c.inner.end, c.value
                );
            }
            Node::QuoteOf(q) => {
                let _ = write!(out, " name={:?}", q.name);
            }
            Node::Custom(c) => {
                let _ = write!(out, " tag={:?}", c.tag);
            }
            _ => {}
        }
        out.push('\n');
        if let Some(children) = node.children() {
            stack.extend(children.iter().rev().map(|c| (c, depth + 1)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;
    use insta::assert_snapshot;

    #[test]
    fn dumps_nested_tree() {
        let root = parse_str("[b Bold [i Italic]] plain").unwrap();
        assert_snapshot!(dump(&Node::Root(root)), @r#"
        Root@0..25
          Bold@0..19
            Text@3..8 "Bold "
            Italic@8..18
              Text@11..17 "Italic"
          Text@19..25 " plain"
        "#);
    }

    #[test]
    fn dumps_payloads() {
        let root = parse_str("[quoteof \"bob\" [img=a.png][code x]]").unwrap();
        assert_snapshot!(dump(&Node::Root(root)), @r#"
        Root@0..35
          QuoteOf@0..35 name="bob"
            Image@15..26 src="a.png"
            Code@26..34 inner=32..33 "x"
        "#);
    }
}
