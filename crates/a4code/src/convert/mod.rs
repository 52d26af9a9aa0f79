//! Single-pass a4code to HTML conversion.
//!
//! [`A4code2Html`] recognizes tags with the same [`Scanner`] and command table
//! as the tree parser but writes output as it reads, keeping only a stack of
//! pending closing markup:
//!
//! ```text
//! "[b hi [link http://x]]"
//!    [b      → write <strong>        push </strong>
//!    hi      → write hi
//!    [link   → write <a href=…>      push </a>
//!    ]       → pop, write </a>
//!    ]       → pop, write </strong>
//! ```
//!
//! Besides HTML it can strip tags ([`CodeType::TagStrip`],
//! [`CodeType::WordsOnly`]) for search indexing and snippets.

mod provider;

use std::fmt;
use std::io::{BufRead, Write};

pub use provider::{LinkProvider, LinkRender, MetadataLinkProvider};

use crate::error::{Error, Result};
use crate::generate::QUOTE_COLORS;
use crate::grammar::{CODE_TERMINATORS, CODEIN_TERMINATORS, Command};
use crate::scanner::Scanner;
use crate::url::{escape_attr, escape_text, sanitize_url};

/// How far ahead a link at line start looks for its closing `]`.
const BLOCK_LINK_LOOKAHEAD: usize = 4096;

const QUOTE_CLOSE: &str = "</div></blockquote>";

/// Output mode of an [`A4code2Html`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeType {
    /// Full HTML.
    #[default]
    Html,
    /// Text with line breaks only; link targets are dropped.
    TableOfContents,
    /// Text with tags removed and literal newlines kept.
    TagStrip,
    /// Words separated by spaces.
    WordsOnly,
}

impl CodeType {
    /// Replacement for a byte that cannot be written as is. Bytes other than
    /// `& < > \n` map to the empty string.
    pub fn escape(self, b: u8) -> &'static str {
        if self == CodeType::WordsOnly {
            return " ";
        }
        match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'\n' if self == CodeType::TagStrip => "\n",
            b'\n' => "<br />\n",
            _ => "",
        }
    }
}

type TagMapper = Box<dyn Fn(&str, &str) -> String>;
type NameMapper = Box<dyn Fn(&str) -> String>;

/// Markup written when an open tag closes.
struct Closer {
    html: String,
    quote: bool,
}

impl Closer {
    fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            quote: false,
        }
    }

    fn quote() -> Self {
        Self {
            html: QUOTE_CLOSE.to_string(),
            quote: true,
        }
    }
}

/// A reusable single-pass converter.
///
/// Conversion state (pending closers, quote depth, line start) is reset at the
/// start of every [`process_reader`](Self::process_reader) call. One instance
/// serves one conversion at a time.
///
/// ```
/// use a4code::convert::{A4code2Html, CodeType};
///
/// let mut html = A4code2Html::new();
/// assert_eq!(html.process("[b Bold [i Italic]] plain"), "<strong>Bold <i>Italic</i></strong> plain");
///
/// let mut strip = A4code2Html::new().with_code_type(CodeType::TagStrip);
/// assert_eq!(strip.process("[b Bold [i Italic]] plain"), "Bold Italic plain");
/// ```
pub struct A4code2Html {
    code_type: CodeType,
    make_toc: bool,
    image_url_mapper: Option<TagMapper>,
    user_color_mapper: Option<NameMapper>,
    provider: Option<Box<dyn LinkProvider>>,
    stack: Vec<Closer>,
    quote_depth: usize,
    at_line_start: bool,
    error: Option<Error>,
}

impl Default for A4code2Html {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for A4code2Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("A4code2Html")
            .field("code_type", &self.code_type)
            .field("make_toc", &self.make_toc)
            .field("image_url_mapper", &self.image_url_mapper.is_some())
            .field("user_color_mapper", &self.user_color_mapper.is_some())
            .field("provider", &self.provider.is_some())
            .field("open_tags", &self.stack.len())
            .field("quote_depth", &self.quote_depth)
            .field("error", &self.error)
            .finish()
    }
}

impl A4code2Html {
    pub fn new() -> Self {
        Self {
            code_type: CodeType::Html,
            make_toc: false,
            image_url_mapper: None,
            user_color_mapper: None,
            provider: None,
            stack: Vec::new(),
            quote_depth: 0,
            at_line_start: true,
            error: None,
        }
    }

    pub fn with_code_type(mut self, code_type: CodeType) -> Self {
        self.code_type = code_type;
        self
    }

    /// Marks the conversion as feeding a table of contents. The flag is
    /// carried for the host and does not change output.
    pub fn with_toc(mut self, make_toc: bool) -> Self {
        self.make_toc = make_toc;
        self
    }

    /// Rewrites image (`"img"`) and link (`"a"`) targets. Ignored for anything
    /// a [`LinkProvider`] handles.
    pub fn with_image_url_mapper(mut self, f: impl Fn(&str, &str) -> String + 'static) -> Self {
        self.image_url_mapper = Some(Box::new(f));
        self
    }

    /// Adds a per-user CSS class to `quoteof` blocks.
    pub fn with_user_color_mapper(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.user_color_mapper = Some(Box::new(f));
        self
    }

    pub fn with_link_provider(mut self, provider: impl LinkProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn code_type(&self) -> CodeType {
        self.code_type
    }

    pub fn set_code_type(&mut self, code_type: CodeType) {
        self.code_type = code_type;
    }

    pub fn makes_toc(&self) -> bool {
        self.make_toc
    }

    /// The error that ended the last [`process`](Self::process) call, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Resets conversion state, keeping configuration.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.quote_depth = 0;
        self.at_line_start = true;
        self.error = None;
    }

    /// Converts markup from `reader`, writing output to `writer` as it goes.
    /// Tags still open at end of input are closed.
    pub fn process_reader<R: BufRead>(&mut self, reader: R, writer: &mut dyn Write) -> Result<()> {
        self.clear();
        let mut scanner = Scanner::new(reader);
        self.run(&mut scanner, writer)?;
        while let Some(closer) = self.stack.pop() {
            writer.write_all(closer.html.as_bytes())?;
        }
        Ok(())
    }

    /// Converts `input` and returns the output.
    ///
    /// Never fails: if conversion stops early the output produced so far is
    /// returned and the error is kept for [`error`](Self::error).
    pub fn process(&mut self, input: &str) -> String {
        let mut out = Vec::new();
        let result = self.process_reader(input.as_bytes(), &mut out);
        if let Err(e) = result {
            log::warn!("a4code conversion stopped early: {e}");
            self.error = Some(e);
        }
        crate::scanner::into_string(out)
    }

    fn run<R: BufRead>(&mut self, s: &mut Scanner<R>, w: &mut dyn Write) -> Result<()> {
        while let Some(b) = s.read_byte()? {
            match b {
                b'[' => {
                    self.command(s, w)?;
                    continue;
                }
                b']' => self.close(w)?,
                b'\n' => {
                    w.write_all(self.code_type.escape(b).as_bytes())?;
                    self.at_line_start = true;
                    continue;
                }
                b'\\' => {
                    let mut literal = Vec::with_capacity(2);
                    s.read_escape(&mut literal)?;
                    self.write_text(w, &literal)?;
                }
                _ => self.write_text(w, &[b])?,
            }
            self.at_line_start = false;
        }
        Ok(())
    }

    /// Writes text bytes, replacing `& < > \n` per the output mode.
    fn write_text(&self, w: &mut dyn Write, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            match b {
                b'&' | b'<' | b'>' | b'\n' => w.write_all(self.code_type.escape(b).as_bytes())?,
                _ => w.write_all(&[b])?,
            }
        }
        Ok(())
    }

    fn close(&mut self, w: &mut dyn Write) -> Result<()> {
        let Some(closer) = self.stack.pop() else {
            log::trace!("stray ']' dropped");
            return Ok(());
        };
        w.write_all(closer.html.as_bytes())?;
        if closer.quote {
            self.quote_depth = self.quote_depth.saturating_sub(1);
        }
        Ok(())
    }

    fn open(&mut self, w: &mut dyn Write, html: &str, closer: Closer) -> Result<()> {
        w.write_all(html.as_bytes())?;
        self.stack.push(closer);
        Ok(())
    }

    fn quote_class(&self) -> String {
        format!("quote-color-{}", self.quote_depth % QUOTE_COLORS)
    }

    /// Handles a tag whose `[` was just read.
    fn command<R: BufRead>(&mut self, s: &mut Scanner<R>, w: &mut dyn Write) -> Result<()> {
        let was_at_line_start = self.at_line_start;
        self.at_line_start = false;

        let word = s.read_token(true)?;
        let command = Command::from_word(&word);
        s.skip_arg_prefix()?;

        match command {
            Command::Image => return self.image(s, w),
            Command::Hr => {
                consume_close(s)?;
                if self.code_type == CodeType::Html {
                    w.write_all(b"<hr />")?;
                }
                return Ok(());
            }
            Command::Code => {
                consume_close(s)?;
                let body = s.read_code_body(CODE_TERMINATORS)?;
                return self.code(s, w, &body.value, was_at_line_start);
            }
            Command::CodeIn => {
                let language = s.read_arg()?;
                s.skip_arg_prefix()?;
                let body = s.read_code_body(CODEIN_TERMINATORS)?;
                return self.code_in(w, &language, &body.value);
            }
            Command::Link => return self.link(s, w, was_at_line_start),
            Command::QuoteOf => {
                let name = s.read_arg()?;
                s.skip_arg_prefix()?;
                return self.quote_of(w, &name);
            }
            _ => {}
        }

        if self.code_type != CodeType::Html {
            self.stack.push(Closer::new(""));
            return Ok(());
        }
        match command {
            Command::Bold => self.open(w, "<strong>", Closer::new("</strong>")),
            Command::Italic => self.open(w, "<i>", Closer::new("</i>")),
            Command::Underline => self.open(w, "<u>", Closer::new("</u>")),
            Command::Sup => self.open(w, "<sup>", Closer::new("</sup>")),
            Command::Sub => self.open(w, "<sub>", Closer::new("</sub>")),
            Command::Spoiler => self.open(w, r#"<span class="spoiler">"#, Closer::new("</span>")),
            Command::Indent => self.open(
                w,
                r#"<div class="a4code-block a4code-indent"><div>"#,
                Closer::new("</div></div>"),
            ),
            Command::Quote if was_at_line_start => {
                let open = format!(
                    r#"<blockquote class="a4code-block a4code-quote {}"><div class="quote-header">Quote:</div><div class="quote-body">"#,
                    self.quote_class()
                );
                self.quote_depth += 1;
                self.open(w, &open, Closer::quote())
            }
            Command::Quote => self.open(w, r#"<q class="a4code-inline a4code-quote">"#, Closer::new("</q>")),
            _ => {
                self.stack.push(Closer::new(""));
                Ok(())
            }
        }
    }

    fn image<R: BufRead>(&mut self, s: &mut Scanner<R>, w: &mut dyn Write) -> Result<()> {
        let raw = s.read_token(false)?;
        consume_close(s)?;
        if self.code_type != CodeType::Html {
            return Ok(());
        }
        let src = match (&self.provider, &self.image_url_mapper) {
            (Some(provider), _) => provider.map_image_url("img", &raw),
            (None, Some(f)) => f("img", &raw),
            (None, None) => raw,
        };
        write!(w, r#"<img class="a4code-image" src="{}" />"#, escape_attr(&src))?;
        Ok(())
    }

    fn code<R: BufRead>(&mut self, s: &mut Scanner<R>, w: &mut dyn Write, body: &str, was_at_line_start: bool) -> Result<()> {
        match self.code_type {
            CodeType::Html => {}
            CodeType::TableOfContents => return Ok(()),
            CodeType::TagStrip | CodeType::WordsOnly => return self.write_text(w, body.as_bytes()),
        }
        let block = was_at_line_start && matches!(s.peek()?, None | Some(b'\n' | b'\r'));
        if block {
            write!(
                w,
                r#"<div class="a4code-block a4code-code-wrapper"><div class="code-header">Code</div><pre class="a4code-code-body">{}</pre></div>"#,
                escape_text(body)
            )?;
        } else {
            write!(w, r#"<code class="a4code-inline a4code-code">{}</code>"#, escape_text(body))?;
        }
        Ok(())
    }

    fn code_in(&mut self, w: &mut dyn Write, language: &str, body: &str) -> Result<()> {
        match self.code_type {
            CodeType::Html => {}
            CodeType::TableOfContents => return Ok(()),
            CodeType::TagStrip | CodeType::WordsOnly => return self.write_text(w, body.as_bytes()),
        }
        let class = escape_attr(language);
        write!(
            w,
            r#"<div class="a4code-block a4code-code-wrapper a4code-language-{class}"><div class="code-header">Code ({})</div><pre class="a4code-code-body"><code class="language-{class}">{}</code></pre></div>"#,
            escape_text(language),
            escape_text(body)
        )?;
        Ok(())
    }

    fn quote_of(&mut self, w: &mut dyn Write, name: &str) -> Result<()> {
        if self.code_type != CodeType::Html {
            self.stack.push(Closer::new(""));
            return Ok(());
        }
        let user = match &self.user_color_mapper {
            Some(f) => format!(" {}", f(name)),
            None => String::new(),
        };
        let open = format!(
            r#"<blockquote class="a4code-block a4code-quoteof{user} {}"><div class="quote-header">Quote of {}:</div><div class="quote-body">"#,
            self.quote_class(),
            escape_text(name)
        );
        self.quote_depth += 1;
        self.open(w, &open, Closer::quote())
    }

    fn link<R: BufRead>(&mut self, s: &mut Scanner<R>, w: &mut dyn Write, was_at_line_start: bool) -> Result<()> {
        let raw = s.read_token(false)?;
        s.skip_arg_prefix()?;
        let immediate = matches!(s.peek()?, None | Some(b']'));

        match self.code_type {
            CodeType::Html => {}
            CodeType::TableOfContents => {
                self.stack.push(Closer::new(""));
                return Ok(());
            }
            CodeType::TagStrip | CodeType::WordsOnly => {
                if immediate {
                    self.write_text(w, raw.as_bytes())?;
                }
                self.stack.push(Closer::new(""));
                return Ok(());
            }
        }

        if let Some(provider) = &self.provider {
            let is_block = was_at_line_start && peek_block_link(s)?;
            let render = provider.render_link(&raw, is_block, immediate);
            w.write_all(render.open.as_bytes())?;
            if !render.consume_immediate {
                self.stack.push(Closer::new(render.close));
                return Ok(());
            }
            if !immediate {
                self.stack.push(Closer::new(""));
                return Ok(());
            }
            consume_close(s)?;
            if is_block {
                consume_line_break(s)?;
                self.at_line_start = true;
            }
            return Ok(());
        }

        let target = match &self.image_url_mapper {
            Some(f) => f("a", &raw),
            None => raw.clone(),
        };
        let (safe, ok) = sanitize_url(&target);
        if !ok {
            log::debug!("link target {raw:?} is not http(s); writing it as text");
            w.write_all(safe.as_bytes())?;
            self.stack.push(Closer::new(""));
            return Ok(());
        }
        write!(w, r#"<a href="{safe}" target="_blank">"#)?;
        if immediate {
            w.write_all(escape_text(&raw).as_bytes())?;
        }
        self.stack.push(Closer::new("</a>"));
        Ok(())
    }
}

/// Consumes a `]` if it is the next byte.
fn consume_close<R: BufRead>(s: &mut Scanner<R>) -> Result<()> {
    if s.peek()? == Some(b']') {
        s.read_byte()?;
    }
    Ok(())
}

/// Consumes a `\n` or `\r\n` if one comes next.
fn consume_line_break<R: BufRead>(s: &mut Scanner<R>) -> Result<()> {
    let skip = match s.peek_n(2)? {
        [b'\n', ..] => 1,
        [b'\r', b'\n'] => 2,
        _ => 0,
    };
    s.skip(skip)
}

/// Whether a link opened at line start is alone on its line: its first `]`
/// comes before any line break and is followed by one or by end of input.
fn peek_block_link<R: BufRead>(s: &mut Scanner<R>) -> Result<bool> {
    let ahead = s.peek_n(BLOCK_LINK_LOOKAHEAD)?;
    let at_eof = ahead.len() < BLOCK_LINK_LOOKAHEAD;
    for (i, &b) in ahead.iter().enumerate() {
        match b {
            b']' => {
                return Ok(match ahead.get(i + 1) {
                    Some(b'\n' | b'\r') => true,
                    Some(_) => false,
                    None => at_eof,
                });
            }
            b'\n' | b'\r' => return Ok(false),
            _ => {}
        }
    }
    Ok(at_eof)
}
