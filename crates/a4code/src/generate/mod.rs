//! Rendering a tree through pluggable generators.
//!
//! [`generate`] walks the tree with an explicit stack and calls the matching
//! [`Generator`] method for each node. A container method writes the opening
//! markup and returns a [`Visit`]; once its children are rendered the driver
//! hands the closing markup to [`Generator::leave`]. Each generator decides
//! escaping, structure and any nesting state such as quote depth, and no
//! nesting depth reaches the call stack.
//!
//! | Generator | Output |
//! |-----------|--------|
//! | [`HtmlGenerator`] | HTML with optional source offsets |
//! | [`Goa4WebGenerator`] | HTML with link cards and tooltips |
//! | [`TextGenerator`] | Text node values only |
//! | [`MarkupGenerator`] | Canonical a4code |
//! | [`MarkdownGenerator`] | Markdown with HTML fallbacks |

mod goa4web;
mod html;
mod markdown;
mod markup;
mod text;

use std::io::Write;

pub use goa4web::Goa4WebGenerator;
pub(crate) use html::QUOTE_COLORS;
pub use html::{HtmlGenerator, HtmlOptions};
pub use markdown::MarkdownGenerator;
pub use markup::MarkupGenerator;
pub(crate) use markup::quoted;
pub use text::TextGenerator;

use crate::ast::{Code, CodeIn, Custom, Element, Hr, Image, Link, Node, QuoteOf, Root, Text};
use crate::error::Result;
use crate::scanner::into_string;

/// How rendering continues after a container's opening markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// Render the children, then pass this closing markup to
    /// [`Generator::leave`].
    Children(String),
    /// The node is fully rendered; its children are skipped.
    Skip,
}

impl Visit {
    pub fn children(close: impl Into<String>) -> Self {
        Visit::Children(close.into())
    }
}

/// One rendering method per node variant.
///
/// Leaf methods write the whole node. Container methods write the opening
/// markup and say how to continue.
pub trait Generator {
    /// Renders a whole document, usually through [`generate_all`].
    fn root(&mut self, w: &mut dyn Write, node: &Root) -> Result<()>;
    fn text(&mut self, w: &mut dyn Write, node: &Text) -> Result<()>;
    fn bold(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit>;
    fn italic(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit>;
    fn underline(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit>;
    fn sup(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit>;
    fn sub(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit>;
    fn link(&mut self, w: &mut dyn Write, node: &Link) -> Result<Visit>;
    fn image(&mut self, w: &mut dyn Write, node: &Image) -> Result<()>;
    fn code(&mut self, w: &mut dyn Write, node: &Code) -> Result<()>;
    fn code_in(&mut self, w: &mut dyn Write, node: &CodeIn) -> Result<()>;
    fn quote(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit>;
    fn quote_of(&mut self, w: &mut dyn Write, node: &QuoteOf) -> Result<Visit>;
    fn spoiler(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit>;
    fn indent(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit>;
    fn hr(&mut self, w: &mut dyn Write, node: &Hr) -> Result<()>;
    fn custom(&mut self, w: &mut dyn Write, node: &Custom) -> Result<Visit>;

    /// Closes a container after its children. Generators that track nesting
    /// state restore it here.
    fn leave(&mut self, w: &mut dyn Write, _node: &Node, close: &str) -> Result<()> {
        w.write_all(close.as_bytes())?;
        Ok(())
    }
}

/// A container whose children are being rendered.
struct Frame<'a> {
    node: &'a Node,
    next: usize,
    close: String,
}

/// Calls the method for `node` and returns a frame if its children follow.
fn enter<'a, G: Generator + ?Sized>(
    w: &mut dyn Write,
    node: &'a Node,
    generator: &mut G,
) -> Result<Option<Frame<'a>>> {
    let visit = match node {
        Node::Root(n) => {
            generator.root(w, n)?;
            return Ok(None);
        }
        Node::Text(n) => return generator.text(w, n).map(|()| None),
        Node::Image(n) => return generator.image(w, n).map(|()| None),
        Node::Code(n) => return generator.code(w, n).map(|()| None),
        Node::CodeIn(n) => return generator.code_in(w, n).map(|()| None),
        Node::Hr(n) => return generator.hr(w, n).map(|()| None),
        Node::Bold(n) => generator.bold(w, n)?,
        Node::Italic(n) => generator.italic(w, n)?,
        Node::Underline(n) => generator.underline(w, n)?,
        Node::Sup(n) => generator.sup(w, n)?,
        Node::Sub(n) => generator.sub(w, n)?,
        Node::Link(n) => generator.link(w, n)?,
        Node::Quote(n) => generator.quote(w, n)?,
        Node::QuoteOf(n) => generator.quote_of(w, n)?,
        Node::Spoiler(n) => generator.spoiler(w, n)?,
        Node::Indent(n) => generator.indent(w, n)?,
        Node::Custom(n) => generator.custom(w, n)?,
    };
    Ok(match visit {
        Visit::Children(close) => Some(Frame { node, next: 0, close }),
        Visit::Skip => None,
    })
}

/// Renders `node` and its descendants with `generator`.
pub fn generate<G: Generator + ?Sized>(
    w: &mut dyn Write,
    node: &Node,
    generator: &mut G,
) -> Result<()> {
    let mut stack: Vec<Frame<'_>> = enter(w, node, generator)?.into_iter().collect();
    while let Some(frame) = stack.last_mut() {
        let node = frame.node;
        if let Some(child) = node.children().unwrap_or_default().get(frame.next) {
            frame.next += 1;
            if let Some(frame) = enter(w, child, generator)? {
                stack.push(frame);
            }
            continue;
        }
        if let Some(Frame { node, close, .. }) = stack.pop() {
            generator.leave(w, node, &close)?;
        }
    }
    Ok(())
}

/// Renders each node in order.
pub fn generate_all<G: Generator + ?Sized>(
    w: &mut dyn Write,
    nodes: &[Node],
    generator: &mut G,
) -> Result<()> {
    for node in nodes {
        generate(w, node, generator)?;
    }
    Ok(())
}

fn render_root<G: Generator>(root: &Root, mut generator: G) -> Result<String> {
    let mut out = Vec::<u8>::new();
    generator.root(&mut out, root)?;
    Ok(into_string(out))
}

/// Renders a document as HTML.
pub fn to_html(root: &Root, options: &HtmlOptions) -> Result<String> {
    render_root(root, HtmlGenerator::new(options))
}

/// Renders a document as HTML with link cards drawn from `options`' metadata provider.
pub fn to_goa4web_html(root: &Root, options: &HtmlOptions) -> Result<String> {
    render_root(root, Goa4WebGenerator::new(options))
}

/// Concatenates the document's text, dropping all markup.
pub fn to_text(root: &Root) -> Result<String> {
    render_root(root, TextGenerator)
}

/// Serializes a document back to canonical a4code.
pub fn to_markup(root: &Root) -> Result<String> {
    render_root(root, MarkupGenerator)
}

pub fn to_markdown(root: &Root) -> Result<String> {
    render_root(root, MarkdownGenerator::default())
}
