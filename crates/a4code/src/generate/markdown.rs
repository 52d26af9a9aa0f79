use std::io::Write;

use super::{Generator, Visit, generate_all};
use crate::ast::{Code, CodeIn, Custom, Element, Hr, Image, Link, Node, QuoteOf, Root, Text};
use crate::error::Result;

/// Best-effort Markdown. Constructs Markdown lacks fall back to inline HTML.
///
/// Tracks the last byte written so a rule always starts on its own line.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownGenerator {
    last: u8,
}

impl Default for MarkdownGenerator {
    fn default() -> Self {
        Self { last: b'\n' }
    }
}

impl MarkdownGenerator {
    fn emit(&mut self, w: &mut dyn Write, s: &str) -> Result<()> {
        if let Some(&b) = s.as_bytes().last() {
            w.write_all(s.as_bytes())?;
            self.last = b;
        }
        Ok(())
    }

    fn wrap(&mut self, w: &mut dyn Write, open: &str, close: &str) -> Result<Visit> {
        self.emit(w, open)?;
        Ok(Visit::children(close))
    }
}

impl Generator for MarkdownGenerator {
    fn root(&mut self, w: &mut dyn Write, node: &Root) -> Result<()> {
        self.last = b'\n';
        generate_all(w, &node.children, self)
    }

    fn text(&mut self, w: &mut dyn Write, node: &Text) -> Result<()> {
        self.emit(w, &node.value)
    }

    fn bold(&mut self, w: &mut dyn Write, _: &Element) -> Result<Visit> {
        self.wrap(w, "**", "**")
    }

    fn italic(&mut self, w: &mut dyn Write, _: &Element) -> Result<Visit> {
        self.wrap(w, "*", "*")
    }

    fn underline(&mut self, w: &mut dyn Write, _: &Element) -> Result<Visit> {
        self.wrap(w, "<u>", "</u>")
    }

    fn sup(&mut self, w: &mut dyn Write, _: &Element) -> Result<Visit> {
        self.wrap(w, "<sup>", "</sup>")
    }

    fn sub(&mut self, w: &mut dyn Write, _: &Element) -> Result<Visit> {
        self.wrap(w, "<sub>", "</sub>")
    }

    fn link(&mut self, w: &mut dyn Write, node: &Link) -> Result<Visit> {
        if node.children.is_empty() {
            self.emit(w, &format!("<{}>", node.href))?;
            return Ok(Visit::Skip);
        }
        self.wrap(w, "[", &format!("]({})", node.href))
    }

    fn image(&mut self, w: &mut dyn Write, node: &Image) -> Result<()> {
        self.emit(w, &format!("![]({})", node.src))
    }

    fn code(&mut self, w: &mut dyn Write, node: &Code) -> Result<()> {
        self.emit(w, &format!("\n```\n{}\n```\n", node.value))
    }

    fn code_in(&mut self, w: &mut dyn Write, node: &CodeIn) -> Result<()> {
        self.emit(w, &format!("\n```{}\n{}\n```\n", node.language, node.value))
    }

    fn quote(&mut self, w: &mut dyn Write, _: &Element) -> Result<Visit> {
        self.wrap(w, "<blockquote>", "</blockquote>")
    }

    fn quote_of(&mut self, w: &mut dyn Write, node: &QuoteOf) -> Result<Visit> {
        let open = format!("<blockquote><p>Quote of {}:</p>", node.name);
        self.wrap(w, &open, "</blockquote>")
    }

    fn spoiler(&mut self, w: &mut dyn Write, _: &Element) -> Result<Visit> {
        self.wrap(w, "<details><summary>Spoiler</summary>", "</details>")
    }

    fn indent(&mut self, w: &mut dyn Write, _: &Element) -> Result<Visit> {
        self.wrap(w, "<blockquote>", "</blockquote>")
    }

    fn hr(&mut self, w: &mut dyn Write, _: &Hr) -> Result<()> {
        if self.last != b'\n' {
            self.emit(w, "\n")?;
        }
        self.emit(w, "---\n")
    }

    fn custom(&mut self, _: &mut dyn Write, _: &Custom) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn leave(&mut self, w: &mut dyn Write, _: &Node, close: &str) -> Result<()> {
        self.emit(w, close)
    }
}

#[cfg(test)]
mod tests {
    use crate::generate::to_markdown;
    use crate::parse_str;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("[b Bold [i Italic]] plain", "**Bold *Italic*** plain")]
    #[case("[u a][sup b][sub c]", "<u>a</u><sup>b</sup><sub>c</sub>")]
    #[case("[link http://x site]", "[site](http://x)")]
    #[case("[link http://x]", "<http://x>")]
    #[case("[img=a.png]", "![](a.png)")]
    #[case("[code let x;]", "\n```\nlet x;\n```\n")]
    #[case(r#"[codein "rust" let x;]"#, "\n```rust\nlet x;\n```\n")]
    #[case(r#"[quoteof "bob" hi]"#, "<blockquote><p>Quote of bob:</p>hi</blockquote>")]
    #[case("[spoiler x]", "<details><summary>Spoiler</summary>x</details>")]
    #[case("[zz kept]", "kept")]
    fn renders(#[case] input: &str, #[case] want: &str) {
        assert_eq!(to_markdown(&parse_str(input).unwrap()).unwrap(), want);
    }

    #[rstest]
    #[case("[hr]", "---\n")]
    #[case("text[hr]", "text\n---\n")]
    #[case("line\n[hr]", "line\n---\n")]
    #[case("[hr][hr]", "---\n---\n")]
    #[case("[code x][hr]", "\n```\nx\n```\n---\n")]
    fn rules_start_on_a_fresh_line(#[case] input: &str, #[case] want: &str) {
        assert_eq!(to_markdown(&parse_str(input).unwrap()).unwrap(), want);
    }
}
