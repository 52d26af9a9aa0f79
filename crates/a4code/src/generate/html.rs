use std::fmt;
use std::io::Write;

use super::{Generator, Visit, generate_all};
use crate::ast::{Code, CodeIn, Custom, Element, Hr, Image, Link, Node, QuoteOf, Root, Span, Text};
use crate::error::Result;
use crate::metadata::{LinkMetadata, LinkMetadataProvider};
use crate::url::{escape_attr, escape_text, sanitize_url};

/// Number of distinct `quote-color-N` classes.
pub const QUOTE_COLORS: usize = 6;

type TagMapper = Box<dyn Fn(&str, &str) -> String>;
type NameMapper = Box<dyn Fn(&str) -> String>;

/// Rendering hooks and switches for the HTML generators.
///
/// ```
/// use a4code::generate::{HtmlOptions, to_html};
///
/// let options = HtmlOptions::default()
///     .without_source_positions()
///     .with_image_url_mapper(|_tag, src| format!("/cache/{src}"));
/// let root = a4code::parse_str("[img=cat.png]").unwrap();
/// assert_eq!(to_html(&root, &options).unwrap(), r#"<img src="/cache/cat.png" />"#);
/// ```
pub struct HtmlOptions {
    source_positions: bool,
    image_url_mapper: Option<TagMapper>,
    image_html_mapper: Option<TagMapper>,
    user_color_mapper: Option<NameMapper>,
    link_metadata: Option<Box<dyn LinkMetadataProvider>>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            source_positions: true,
            image_url_mapper: None,
            image_html_mapper: None,
            user_color_mapper: None,
            link_metadata: None,
        }
    }
}

impl fmt::Debug for HtmlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlOptions")
            .field("source_positions", &self.source_positions)
            .field("image_url_mapper", &self.image_url_mapper.is_some())
            .field("image_html_mapper", &self.image_html_mapper.is_some())
            .field("user_color_mapper", &self.user_color_mapper.is_some())
            .field("link_metadata", &self.link_metadata.is_some())
            .finish()
    }
}

impl HtmlOptions {
    /// Drops the `data-start-pos`/`data-end-pos` attributes and the spans that
    /// exist only to carry them.
    pub fn without_source_positions(mut self) -> Self {
        self.source_positions = false;
        self
    }

    /// Rewrites image (`"img"`) and link (`"a"`) targets before emission.
    pub fn with_image_url_mapper(mut self, f: impl Fn(&str, &str) -> String + 'static) -> Self {
        self.image_url_mapper = Some(Box::new(f));
        self
    }

    /// Replaces the whole `<img>` element when `f` returns a non-empty string.
    pub fn with_image_html_mapper(mut self, f: impl Fn(&str, &str) -> String + 'static) -> Self {
        self.image_html_mapper = Some(Box::new(f));
        self
    }

    /// Adds a per-user CSS class to `quoteof` blocks.
    pub fn with_user_color_mapper(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.user_color_mapper = Some(Box::new(f));
        self
    }

    /// Supplies link previews to [`Goa4WebGenerator`](super::Goa4WebGenerator).
    pub fn with_link_metadata(mut self, provider: impl LinkMetadataProvider + 'static) -> Self {
        self.link_metadata = Some(Box::new(provider));
        self
    }

    pub fn source_positions(&self) -> bool {
        self.source_positions
    }

    pub(crate) fn map_url(&self, tag: &str, value: &str) -> String {
        match &self.image_url_mapper {
            Some(f) => f(tag, value),
            None => value.to_string(),
        }
    }

    fn image_html(&self, tag: &str, value: &str) -> Option<String> {
        let f = self.image_html_mapper.as_ref()?;
        Some(f(tag, value)).filter(|html| !html.is_empty())
    }

    pub(crate) fn user_class(&self, name: &str) -> Option<String> {
        self.user_color_mapper.as_ref().map(|f| f(name))
    }

    pub(crate) fn metadata(&self, url: &str) -> Option<LinkMetadata> {
        self.link_metadata.as_ref()?.metadata(url)
    }
}

/// Renders HTML, tagging elements with their source byte offsets unless
/// [`HtmlOptions::without_source_positions`] is set.
///
/// Entering a quote raises the quote depth and leaving it restores the
/// previous depth, so sibling quotes share a color.
#[derive(Debug, Clone)]
pub struct HtmlGenerator<'a> {
    options: &'a HtmlOptions,
    depth: usize,
}

impl<'a> HtmlGenerator<'a> {
    pub fn new(options: &'a HtmlOptions) -> Self {
        Self { options, depth: 0 }
    }

    /// Current quote nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn options(&self) -> &'a HtmlOptions {
        self.options
    }

    pub(crate) fn pos(&self, span: Span) -> String {
        if self.options.source_positions {
            format!(r#" data-start-pos="{}" data-end-pos="{}""#, span.start, span.end)
        } else {
            String::new()
        }
    }

    fn color_class(&self) -> String {
        format!("quote-color-{}", self.depth % QUOTE_COLORS)
    }

    /// Writes `<open pos>` and `lead`; `close` follows the children.
    fn container(&self, w: &mut dyn Write, open: &str, span: Span, lead: &str, close: &str) -> Result<Visit> {
        write!(w, "<{open}{}>{lead}", self.pos(span))?;
        Ok(Visit::children(close))
    }

    fn element(&self, w: &mut dyn Write, tag: &str, node: &Element) -> Result<Visit> {
        self.container(w, tag, node.span, "", &format!("</{tag}>"))
    }

    fn enter_quote(&mut self, w: &mut dyn Write, open: &str, span: Span, lead: &str) -> Result<Visit> {
        let visit = self.container(w, open, span, lead, "</div></blockquote>")?;
        self.depth += 1;
        Ok(visit)
    }

    fn code_body(&self, w: &mut dyn Write, inner: Span, value: &str) -> Result<()> {
        let escaped = escape_text(value);
        if self.options.source_positions {
            write!(w, "<span{}>{escaped}</span>", self.pos(inner))?;
        } else {
            w.write_all(escaped.as_bytes())?;
        }
        Ok(())
    }
}

/// Writes text with `& < >` escaped, `\r` dropped and each `\n` as a line break.
fn write_text(w: &mut dyn Write, value: &str) -> Result<()> {
    for (i, line) in value.split('\n').enumerate() {
        if i > 0 {
            w.write_all(b"<br />\n")?;
        }
        let line = line.replace('\r', "");
        w.write_all(escape_text(&line).as_bytes())?;
    }
    Ok(())
}

impl Generator for HtmlGenerator<'_> {
    fn root(&mut self, w: &mut dyn Write, node: &Root) -> Result<()> {
        generate_all(w, &node.children, self)
    }

    fn text(&mut self, w: &mut dyn Write, node: &Text) -> Result<()> {
        if self.options.source_positions {
            write!(w, "<span{}>", self.pos(node.span))?;
            write_text(w, &node.value)?;
            w.write_all(b"</span>")?;
            return Ok(());
        }
        write_text(w, &node.value)
    }

    fn bold(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.element(w, "strong", node)
    }

    fn italic(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.element(w, "i", node)
    }

    fn underline(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.element(w, "u", node)
    }

    fn sup(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.element(w, "sup", node)
    }

    fn sub(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.element(w, "sub", node)
    }

    /// A plain anchor, or escaped text when the target is not `http`/`https`.
    fn link(&mut self, w: &mut dyn Write, node: &Link) -> Result<Visit> {
        let target = self.options.map_url("a", &node.href);
        let (safe, ok) = sanitize_url(&target);
        if !ok {
            log::debug!("link target {:?} is not http(s); rendering as text", node.href);
            if self.options.source_positions {
                return self.container(w, "span", node.span, &safe, "</span>");
            }
            w.write_all(safe.as_bytes())?;
            return Ok(Visit::children(""));
        }
        write!(w, r#"<a href="{safe}" target="_BLANK"{}>"#, self.pos(node.span))?;
        if node.children.is_empty() {
            w.write_all(escape_text(&node.href).as_bytes())?;
        }
        Ok(Visit::children("</a>"))
    }

    fn image(&mut self, w: &mut dyn Write, node: &Image) -> Result<()> {
        if let Some(markup) = self.options.image_html("img", &node.src) {
            w.write_all(markup.as_bytes())?;
            return Ok(());
        }
        let src = self.options.map_url("img", &node.src);
        write!(w, r#"<img src="{}"{} />"#, escape_attr(&src), self.pos(node.span))?;
        Ok(())
    }

    fn code(&mut self, w: &mut dyn Write, node: &Code) -> Result<()> {
        write!(w, r#"<pre class="a4code-block a4code-code"{}>"#, self.pos(node.span))?;
        self.code_body(w, node.inner, &node.value)?;
        w.write_all(b"</pre>")?;
        Ok(())
    }

    fn code_in(&mut self, w: &mut dyn Write, node: &CodeIn) -> Result<()> {
        let language = escape_attr(&node.language);
        write!(
            w,
            r#"<pre class="a4code-block a4code-code a4code-language-{language}"{}><code class="language-{language}">"#,
            self.pos(node.span)
        )?;
        self.code_body(w, node.inner, &node.value)?;
        w.write_all(b"</code></pre>")?;
        Ok(())
    }

    fn quote(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        let open = format!(r#"blockquote class="a4code-block a4code-quote {}""#, self.color_class());
        self.enter_quote(w, &open, node.span, r#"<div class="quote-body">"#)
    }

    fn quote_of(&mut self, w: &mut dyn Write, node: &QuoteOf) -> Result<Visit> {
        let user = self
            .options
            .user_class(&node.name)
            .map(|class| format!(" {}", escape_attr(&class)))
            .unwrap_or_default();
        let open = format!(
            r#"blockquote class="a4code-block a4code-quoteof{user} {}""#,
            self.color_class()
        );
        let lead = format!(
            r#"<div class="quote-header">Quote of {}:</div><div class="quote-body">"#,
            escape_text(&node.name)
        );
        self.enter_quote(w, &open, node.span, &lead)
    }

    fn spoiler(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.container(w, r#"span class="spoiler""#, node.span, "", "</span>")
    }

    fn indent(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.container(
            w,
            r#"div class="a4code-block a4code-indent""#,
            node.span,
            "<div>",
            "</div></div>",
        )
    }

    fn hr(&mut self, w: &mut dyn Write, node: &Hr) -> Result<()> {
        write!(w, "<hr{} />", self.pos(node.span))?;
        Ok(())
    }

    fn custom(&mut self, w: &mut dyn Write, node: &Custom) -> Result<Visit> {
        let mut open = format!("[{}", escape_text(&node.tag));
        if !node.children.is_empty() {
            open.push(' ');
        }
        if self.options.source_positions {
            return self.container(w, "span", node.span, &open, "]</span>");
        }
        w.write_all(open.as_bytes())?;
        Ok(Visit::children("]"))
    }

    fn leave(&mut self, w: &mut dyn Write, node: &Node, close: &str) -> Result<()> {
        if matches!(node, Node::Quote(_) | Node::QuoteOf(_)) {
            self.depth = self.depth.saturating_sub(1);
        }
        w.write_all(close.as_bytes())?;
        Ok(())
    }
}
