//! The a4code syntax tree.
//!
//! Every node records the byte range it was parsed from. Container nodes own
//! their children in document order; leaves carry their payload directly.
//! Containers drop and clone their subtrees without recursing, so trees of
//! any depth are safe to hold.
//!
//! ```text
//! "[b Bold [i Italic]] plain"
//!
//! Root@0..25
//!   Bold@0..19
//!     Text@3..8 "Bold "
//!     Italic@8..18
//!       Text@11..17 "Italic"
//!   Text@19..25 " plain"
//! ```

mod deep;
mod dump;
pub mod invariants;
mod links;
mod walk;

pub use dump::dump;
pub use links::determine_link_properties;
pub use walk::{transform, walk};

/// A byte range `[start, end)` into the parsed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// The top-level document.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Root {
    pub span: Span,
    pub children: Vec<Node>,
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            span: Span::default(),
            children,
        }
    }

    /// Annotates every link in the document. See [`determine_link_properties`].
    pub fn determine_link_properties(&mut self) {
        links::annotate_tree(&mut self.children, true);
    }
}

/// Literal text with escapes already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text {
    pub span: Span,
    pub value: String,
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            span: Span::default(),
            value: value.into(),
        }
    }
}

/// A container without a payload: bold, italic, underline, sup, sub, quote,
/// spoiler and indent.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    pub span: Span,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            span: Span::default(),
            children,
        }
    }
}

/// A hyperlink. The children form the visible label.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub span: Span,
    /// Raw, unsanitized target.
    pub href: String,
    /// Sole content of its line inside a block context.
    pub is_block: bool,
    /// Closed with no label.
    pub is_immediate_close: bool,
    pub children: Vec<Node>,
}

impl Link {
    pub fn new(href: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            span: Span::default(),
            href: href.into(),
            is_block: false,
            is_immediate_close: false,
            children,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Image {
    pub span: Span,
    pub src: String,
}

/// A raw code body. Brackets inside are not parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Code {
    /// The whole tag including delimiters.
    pub span: Span,
    /// The body alone.
    pub inner: Span,
    pub value: String,
}

/// A raw code body tagged with a language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeIn {
    pub span: Span,
    pub inner: Span,
    pub language: String,
    pub value: String,
}

/// A quote attributed to `name`.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuoteOf {
    pub span: Span,
    pub name: String,
    pub children: Vec<Node>,
}

/// Any command outside the fixed tag set.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Custom {
    pub span: Span,
    pub tag: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hr {
    pub span: Span,
}

/// A parsed a4code node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Node {
    Root(Root),
    Text(Text),
    Bold(Element),
    Italic(Element),
    Underline(Element),
    Sup(Element),
    Sub(Element),
    Link(Link),
    Image(Image),
    Code(Code),
    CodeIn(CodeIn),
    Quote(Element),
    QuoteOf(QuoteOf),
    Spoiler(Element),
    Indent(Element),
    Hr(Hr),
    Custom(Custom),
}

impl Node {
    /// Short variant name used in tree dumps and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Root(_) => "Root",
            Node::Text(_) => "Text",
            Node::Bold(_) => "Bold",
            Node::Italic(_) => "Italic",
            Node::Underline(_) => "Underline",
            Node::Sup(_) => "Sup",
            Node::Sub(_) => "Sub",
            Node::Link(_) => "Link",
            Node::Image(_) => "Image",
            Node::Code(_) => "Code",
            Node::CodeIn(_) => "CodeIn",
            Node::Quote(_) => "Quote",
            Node::QuoteOf(_) => "QuoteOf",
            Node::Spoiler(_) => "Spoiler",
            Node::Indent(_) => "Indent",
            Node::Hr(_) => "Hr",
            Node::Custom(_) => "Custom",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::Root(n) => n.span,
            Node::Text(n) => n.span,
            Node::Bold(n)
            | Node::Italic(n)
            | Node::Underline(n)
            | Node::Sup(n)
            | Node::Sub(n)
            | Node::Quote(n)
            | Node::Spoiler(n)
            | Node::Indent(n) => n.span,
            Node::Link(n) => n.span,
            Node::Image(n) => n.span,
            Node::Code(n) => n.span,
            Node::CodeIn(n) => n.span,
            Node::QuoteOf(n) => n.span,
            Node::Hr(n) => n.span,
            Node::Custom(n) => n.span,
        }
    }

    pub fn span_mut(&mut self) -> &mut Span {
        match self {
            Node::Root(n) => &mut n.span,
            Node::Text(n) => &mut n.span,
            Node::Bold(n)
            | Node::Italic(n)
            | Node::Underline(n)
            | Node::Sup(n)
            | Node::Sub(n)
            | Node::Quote(n)
            | Node::Spoiler(n)
            | Node::Indent(n) => &mut n.span,
            Node::Link(n) => &mut n.span,
            Node::Image(n) => &mut n.span,
            Node::Code(n) => &mut n.span,
            Node::CodeIn(n) => &mut n.span,
            Node::QuoteOf(n) => &mut n.span,
            Node::Hr(n) => &mut n.span,
            Node::Custom(n) => &mut n.span,
        }
    }

    /// Returns the children of a container node, or `None` for leaves.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root(n) => Some(&n.children),
            Node::Bold(n)
            | Node::Italic(n)
            | Node::Underline(n)
            | Node::Sup(n)
            | Node::Sub(n)
            | Node::Quote(n)
            | Node::Spoiler(n)
            | Node::Indent(n) => Some(&n.children),
            Node::Link(n) => Some(&n.children),
            Node::QuoteOf(n) => Some(&n.children),
            Node::Custom(n) => Some(&n.children),
            Node::Text(_) | Node::Image(_) | Node::Code(_) | Node::CodeIn(_) | Node::Hr(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(n) => Some(&mut n.children),
            Node::Bold(n)
            | Node::Italic(n)
            | Node::Underline(n)
            | Node::Sup(n)
            | Node::Sub(n)
            | Node::Quote(n)
            | Node::Spoiler(n)
            | Node::Indent(n) => Some(&mut n.children),
            Node::Link(n) => Some(&mut n.children),
            Node::QuoteOf(n) => Some(&mut n.children),
            Node::Custom(n) => Some(&mut n.children),
            Node::Text(_) | Node::Image(_) | Node::Code(_) | Node::CodeIn(_) | Node::Hr(_) => None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.children().is_some()
    }

    /// Root, Quote, QuoteOf, Spoiler and Indent behave like paragraphs: a link
    /// alone on a line inside them renders as a block.
    pub fn is_block_context(&self) -> bool {
        matches!(
            self,
            Node::Root(_) | Node::Quote(_) | Node::QuoteOf(_) | Node::Spoiler(_) | Node::Indent(_)
        )
    }
}

impl From<Root> for Node {
    fn from(root: Root) -> Self {
        Node::Root(root)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<Link> for Node {
    fn from(link: Link) -> Self {
        Node::Link(link)
    }
}
