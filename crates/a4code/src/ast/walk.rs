use super::Node;

/// Visits `node` and its descendants in pre-order, stopping at the first error.
///
/// Uses an explicit stack, so arbitrarily deep trees are safe to walk.
pub fn walk<E, F>(node: &Node, mut f: F) -> Result<(), E>
where
    F: FnMut(&Node) -> Result<(), E>,
{
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        f(n)?;
        if let Some(children) = n.children() {
            stack.extend(children.iter().rev());
        }
    }
    Ok(())
}

/// A node whose children are waiting to be transformed.
struct Frame {
    node: Node,
    rest: std::vec::IntoIter<Node>,
    kept: Vec<Node>,
}

impl Frame {
    fn new(mut node: Node) -> Self {
        let children = node.children_mut().map(std::mem::take).unwrap_or_default();
        Self {
            kept: Vec::with_capacity(children.len()),
            rest: children.into_iter(),
            node,
        }
    }
}

/// Rewrites a tree bottom-up.
///
/// Children are transformed first; a child whose transform returns `None` is
/// removed and any returned node replaces it, even one of a different kind.
/// `op` is then applied to `node` itself and its result returned.
///
/// Pending nodes are held on an explicit stack, so depth is bounded only by
/// memory.
pub fn transform<E, F>(node: Node, op: &mut F) -> Result<Option<Node>, E>
where
    F: FnMut(Node) -> Result<Option<Node>, E>,
{
    let mut stack = vec![Frame::new(node)];
    loop {
        let Some(frame) = stack.last_mut() else {
            return Ok(None);
        };
        if let Some(child) = frame.rest.next() {
            stack.push(Frame::new(child));
            continue;
        }
        let Some(Frame { mut node, kept, .. }) = stack.pop() else {
            return Ok(None);
        };
        if let Some(children) = node.children_mut() {
            *children = kept;
        }
        let result = op(node)?;
        match stack.last_mut() {
            Some(parent) => parent.kept.extend(result),
            None => return Ok(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Element, Hr, Root, Text};
    use crate::parse_str;
    use pretty_assertions::assert_eq;
    use std::convert::Infallible;

    fn sample() -> Node {
        Node::Root(Root::new(vec![
            Node::Bold(Element::new(vec![Node::Text(Text::new("a"))])),
            Node::Hr(Hr::default()),
            Node::Text(Text::new("b")),
        ]))
    }

    #[test]
    fn walk_is_pre_order() {
        let mut seen = Vec::new();
        walk(&sample(), |n| {
            seen.push(n.kind());
            Ok::<_, Infallible>(())
        })
        .unwrap();
        assert_eq!(seen, ["Root", "Bold", "Text", "Hr", "Text"]);
    }

    #[test]
    fn walk_stops_at_first_error() {
        let mut visited = 0;
        let result = walk(&sample(), |n| {
            visited += 1;
            if matches!(n, Node::Text(_)) {
                Err("text")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("text"));
        assert_eq!(visited, 3);
    }

    #[test]
    fn transform_deletes_and_replaces() {
        let mut order = Vec::new();
        let out = transform(sample(), &mut |n: Node| {
            order.push(n.kind());
            Ok::<_, Infallible>(match n {
                Node::Hr(_) => None,
                Node::Bold(el) => Some(Node::Italic(el)),
                other => Some(other),
            })
        })
        .unwrap()
        .unwrap();

        assert_eq!(order, ["Text", "Bold", "Hr", "Text", "Root"]);
        let kinds: Vec<_> = out.children().unwrap().iter().map(Node::kind).collect();
        assert_eq!(kinds, ["Italic", "Text"]);
    }

    #[test]
    fn transform_can_delete_the_root() {
        let out = transform(sample(), &mut |n: Node| {
            Ok::<_, Infallible>(if matches!(n, Node::Root(_)) { None } else { Some(n) })
        })
        .unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn transform_propagates_errors() {
        let root = parse_str("[b x]").unwrap();
        let result = transform(Node::Root(root), &mut |n: Node| match n {
            Node::Text(_) => Err("boom"),
            other => Ok(Some(other)),
        });
        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn transform_handles_deep_trees() {
        let mut node = Node::Text(Text::new("x"));
        for _ in 0..300_000 {
            node = Node::Bold(Element::new(vec![node]));
        }
        let mut visited = 0;
        let out = transform(node, &mut |n: Node| {
            visited += 1;
            Ok::<_, Infallible>(match n {
                Node::Bold(el) => Some(Node::Italic(el)),
                other => Some(other),
            })
        })
        .unwrap()
        .unwrap();

        assert_eq!(visited, 300_001);
        let mut depth = 0;
        let mut cursor = &out;
        while let Node::Italic(el) = cursor {
            depth += 1;
            cursor = &el.children[0];
        }
        assert_eq!(depth, 300_000);
        assert!(matches!(cursor, Node::Text(t) if t.value == "x"));
    }
}
