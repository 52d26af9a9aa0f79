use super::Node;

/// Decides `is_block` and `is_immediate_close` for every link under `node`.
///
/// A link closes immediately when it has no children. It is a block link when
/// its parent is a block context and it sits alone on its line: the previous
/// sibling is absent or text ending in `\n`, and the next sibling is absent or
/// text starting with `\n`. Any other neighbouring node breaks the line.
///
/// Block-ness depends on siblings parsed after the link closes, so this runs
/// as a separate pass over the finished tree.
pub fn determine_link_properties(node: &mut Node) {
    let block_context = node.is_block_context();
    if let Some(children) = node.children_mut() {
        annotate_tree(children, block_context);
    }
}

pub(super) fn annotate_tree(children: &mut Vec<Node>, block_context: bool) {
    let mut pending = vec![(children, block_context)];
    while let Some((children, block_context)) = pending.pop() {
        mark_links(children, block_context);
        for child in children {
            let child_context = child.is_block_context();
            if let Some(grandchildren) = child.children_mut() {
                pending.push((grandchildren, child_context));
            }
        }
    }
}

fn mark_links(children: &mut [Node], block_context: bool) {
    for i in 0..children.len() {
        if !matches!(children[i], Node::Link(_)) {
            continue;
        }
        let is_block = block_context
            && (i == 0 || ends_line(&children[i - 1]))
            && children.get(i + 1).is_none_or(starts_line);
        if let Node::Link(link) = &mut children[i] {
            link.is_immediate_close = link.children.is_empty();
            link.is_block = is_block;
        }
    }
}

fn ends_line(node: &Node) -> bool {
    matches!(node, Node::Text(t) if t.value.ends_with('\n'))
}

fn starts_line(node: &Node) -> bool {
    matches!(node, Node::Text(t) if t.value.starts_with('\n'))
}
