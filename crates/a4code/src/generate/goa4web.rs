use std::io::Write;

use super::{Generator, HtmlGenerator, HtmlOptions, Visit};
use crate::ast::{Code, CodeIn, Custom, Element, Hr, Image, Link, Node, QuoteOf, Root, Text};
use crate::error::Result;
use crate::metadata::full_card;
use crate::url::{escape_attr, escape_text, sanitize_url};

/// Longest description shown as link text before it is shortened.
const DESCRIPTION_TEXT_LIMIT: usize = 50;

/// HTML for the goa4web site: the plain HTML generator plus link previews.
///
/// When [`HtmlOptions::with_link_metadata`] knows a link target:
///
/// - a block link without a label becomes an external link card;
/// - an inline link without a label shows the metadata title;
/// - a labelled link keeps its label and gains a `title - description` tooltip.
///
/// Links without metadata render exactly as [`HtmlGenerator`] renders them.
#[derive(Debug, Clone)]
pub struct Goa4WebGenerator<'a> {
    html: HtmlGenerator<'a>,
}

impl<'a> Goa4WebGenerator<'a> {
    pub fn new(options: &'a HtmlOptions) -> Self {
        Self {
            html: HtmlGenerator::new(options),
        }
    }
}

fn shorten(description: &str) -> String {
    if description.chars().count() <= DESCRIPTION_TEXT_LIMIT {
        return description.to_string();
    }
    let head: String = description.chars().take(DESCRIPTION_TEXT_LIMIT - 3).collect();
    format!("{head}...")
}

impl Generator for Goa4WebGenerator<'_> {
    fn root(&mut self, w: &mut dyn Write, node: &Root) -> Result<()> {
        super::generate_all(w, &node.children, self)
    }

    fn text(&mut self, w: &mut dyn Write, node: &Text) -> Result<()> {
        self.html.text(w, node)
    }

    fn bold(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.html.bold(w, node)
    }

    fn italic(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.html.italic(w, node)
    }

    fn underline(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.html.underline(w, node)
    }

    fn sup(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.html.sup(w, node)
    }

    fn sub(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.html.sub(w, node)
    }

    fn link(&mut self, w: &mut dyn Write, node: &Link) -> Result<Visit> {
        let options = self.html.options();
        let (safe, ok) = sanitize_url(&options.map_url("a", &node.href));
        let Some(meta) = ok.then(|| options.metadata(&node.href)).flatten() else {
            return self.html.link(w, node);
        };
        let pos = self.html.pos(node.span);

        if node.is_block && node.is_immediate_close {
            w.write_all(full_card(&safe, &node.href, &meta).as_bytes())?;
            return Ok(Visit::Skip);
        }
        if node.is_immediate_close {
            let label = [meta.title.clone(), shorten(&meta.description), node.href.clone()]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or_default();
            write!(
                w,
                r#"<a href="{safe}" target="_blank" rel="noopener noreferrer" title="{}"{pos}>{}</a>"#,
                escape_attr(&meta.description),
                escape_text(&label)
            )?;
            return Ok(Visit::Skip);
        }
        write!(
            w,
            r#"<a href="{safe}" target="_blank" rel="noopener noreferrer" title="{}"{pos}>"#,
            escape_attr(&meta.tooltip())
        )?;
        Ok(Visit::children("</a>"))
    }

    fn image(&mut self, w: &mut dyn Write, node: &Image) -> Result<()> {
        self.html.image(w, node)
    }

    fn code(&mut self, w: &mut dyn Write, node: &Code) -> Result<()> {
        self.html.code(w, node)
    }

    fn code_in(&mut self, w: &mut dyn Write, node: &CodeIn) -> Result<()> {
        self.html.code_in(w, node)
    }

    fn quote(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.html.quote(w, node)
    }

    fn quote_of(&mut self, w: &mut dyn Write, node: &QuoteOf) -> Result<Visit> {
        self.html.quote_of(w, node)
    }

    fn spoiler(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.html.spoiler(w, node)
    }

    fn indent(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.html.indent(w, node)
    }

    fn hr(&mut self, w: &mut dyn Write, node: &Hr) -> Result<()> {
        self.html.hr(w, node)
    }

    fn custom(&mut self, w: &mut dyn Write, node: &Custom) -> Result<Visit> {
        self.html.custom(w, node)
    }

    fn leave(&mut self, w: &mut dyn Write, node: &Node, close: &str) -> Result<()> {
        self.html.leave(w, node, close)
    }
}
