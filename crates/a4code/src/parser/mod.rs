//! Streaming a4code parser.
//!
//! The parser reads one byte at a time and keeps currently open tags on an
//! explicit stack instead of the call stack, so nesting depth is bounded only
//! by memory:
//!
//! ```text
//! bytes → Scanner → [ open tag / ] close / text ] → completed nodes
//!                          │
//!                     open-node stack
//! ```
//!
//! A node is complete when its closing `]` is read, or at end of input for
//! tags left open. Completed nodes are appended to their parent and offered to
//! the caller, filtered by nesting level (top-level nodes are level 1).
//!
//! - [`stream`] yields completed nodes lazily as an iterator.
//! - [`parse`] and [`parse_str`] collect the top-level nodes into a [`Root`]
//!   and annotate its links.

mod tags;

use std::collections::VecDeque;
use std::io::BufRead;

use crate::ast::{Node, Root, Span, Text};
use crate::error::Result;
use crate::scanner::{Scanner, into_string};

/// Which completed nodes a [`Stream`] yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    max_depth: Option<usize>,
}

impl StreamOptions {
    /// Yields nodes at level `depth` or shallower; top-level nodes are level 1.
    pub fn with_depth(depth: usize) -> Self {
        Self {
            max_depth: Some(depth),
        }
    }

    /// Yields every node at every level. This is the default.
    pub fn all_nodes() -> Self {
        Self { max_depth: None }
    }

    fn accepts(&self, level: usize) -> bool {
        self.max_depth.is_none_or(|max| level <= max)
    }
}

/// A forward-only iterator over completed nodes.
///
/// Nested nodes are yielded as they close, before their parent, so with
/// [`StreamOptions::all_nodes`] a node is also contained (as a copy) in every
/// ancestor yielded later. The iterator ends at end of input.
pub struct Stream<R> {
    scanner: Scanner<R>,
    options: StreamOptions,
    /// Open containers, innermost last.
    stack: Vec<Node>,
    text: Vec<u8>,
    text_span: Span,
    ready: VecDeque<Node>,
    finished: bool,
}

/// Parses `reader` lazily, yielding completed nodes selected by `options`.
pub fn stream<R: BufRead>(reader: R, options: StreamOptions) -> Stream<R> {
    Stream {
        scanner: Scanner::new(reader),
        options,
        stack: Vec::new(),
        text: Vec::new(),
        text_span: Span::default(),
        ready: VecDeque::new(),
        finished: false,
    }
}

/// Parses a whole document and annotates its links.
pub fn parse<R: BufRead>(reader: R) -> Result<Root> {
    let mut nodes = stream(reader, StreamOptions::with_depth(1));
    let mut children = Vec::new();
    for node in &mut nodes {
        children.push(node?);
    }
    let mut root = Root {
        span: Span::new(0, nodes.scanner.pos()),
        children,
    };
    root.determine_link_properties();
    Ok(root)
}

pub fn parse_str(input: &str) -> Result<Root> {
    parse(input.as_bytes())
}

/// Parses a whole document and returns only its top-level nodes.
pub fn parse_nodes<R: BufRead>(reader: R) -> Result<Vec<Node>> {
    let mut root = parse(reader)?;
    Ok(std::mem::take(&mut root.children))
}

pub fn parse_nodes_str(input: &str) -> Result<Vec<Node>> {
    parse_nodes(input.as_bytes())
}

impl<R: BufRead> Stream<R> {
    /// Processes one input byte, or finishes at end of input.
    fn step(&mut self) -> Result<()> {
        let Some(b) = self.scanner.read_byte()? else {
            self.finish();
            return Ok(());
        };
        match b {
            b'[' => {
                self.flush_text();
                self.open_tag(self.scanner.pos() - 1)?;
            }
            b']' => {
                self.flush_text();
                self.close_tag();
            }
            b'\\' => {
                self.mark_text_start(self.scanner.pos() - 1);
                self.scanner.read_escape(&mut self.text)?;
                self.text_span.end = self.scanner.pos();
            }
            _ => {
                self.mark_text_start(self.scanner.pos() - 1);
                self.text.push(b);
                self.text_span.end = self.scanner.pos();
            }
        }
        Ok(())
    }

    fn mark_text_start(&mut self, pos: usize) {
        if self.text.is_empty() {
            self.text_span = Span::new(pos, pos);
        }
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let value = into_string(std::mem::take(&mut self.text));
        self.complete(Node::Text(Text {
            span: self.text_span,
            value,
        }));
    }

    /// Pushes an opened container. Its end is fixed when it closes.
    fn push_open(&mut self, node: Node) {
        log::trace!("open {} at {}", node.kind(), node.span().start);
        self.stack.push(node);
    }

    /// A `]` closes the innermost open tag; with nothing open it is dropped.
    fn close_tag(&mut self) {
        let end = self.scanner.pos();
        match self.stack.pop() {
            Some(mut node) => {
                node.span_mut().end = end;
                log::trace!("close {} at {end}", node.kind());
                self.complete(node);
            }
            None => log::trace!("stray ']' at {} ignored", end - 1),
        }
    }

    fn finish(&mut self) {
        self.flush_text();
        let end = self.scanner.pos();
        while let Some(mut node) = self.stack.pop() {
            log::debug!(
                "implicitly closing {} opened at {} at end of input",
                node.kind(),
                node.span().start
            );
            node.span_mut().end = end;
            self.complete(node);
        }
        self.finished = true;
    }

    /// Attaches a finished node to the innermost open container and queues it
    /// for the caller if its level is wanted.
    fn complete(&mut self, node: Node) {
        let level = self.stack.len() + 1;
        let wanted = self.options.accepts(level);
        match self.stack.last_mut().and_then(Node::children_mut) {
            Some(children) => {
                if wanted {
                    self.ready.push_back(node.clone());
                }
                children.push(node);
            }
            None => {
                if wanted {
                    self.ready.push_back(node);
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for Stream<R> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.ready.pop_front() {
                return Some(Ok(node));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.step() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}
