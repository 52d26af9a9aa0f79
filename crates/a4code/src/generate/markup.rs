use std::io::Write;

use super::{Generator, Visit, generate_all};
use crate::ast::{Code, CodeIn, Custom, Element, Hr, Image, Link, Node, QuoteOf, Root, Text};
use crate::error::Result;

/// Serializes a tree back to a4code.
///
/// Output is canonical: each command uses one spelling, one space separates a
/// command from its content and every bracket is closed. Parsing the output
/// gives back an equivalent tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupGenerator;

fn escape_with(s: &str, special: &[u8]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() && special.contains(&(c as u8)) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes text content.
fn escape_text(s: &str) -> String {
    escape_with(s, b"[]=\\*/_")
}

/// Escapes a bare argument such as a link target.
fn escape_arg(s: &str) -> String {
    escape_with(s, b"[]=\\ ")
}

/// Escapes a raw code body.
fn escape_code(s: &str) -> String {
    escape_with(s, b"[]\\")
}

/// Whether a code body leaves no bracket open once re-read. A body that does
/// needs an explicit terminator, since a bare `]` would only close a bracket.
fn closes_with_bracket(s: &str) -> bool {
    let depth = s.bytes().fold(0usize, |depth, b| match b {
        b'[' => depth + 1,
        b']' => depth.saturating_sub(1),
        _ => depth,
    });
    depth == 0
}

fn code_body(w: &mut dyn Write, head: &str, value: &str, terminator: &str) -> Result<()> {
    let close = if closes_with_bracket(value) { "]" } else { terminator };
    write!(w, "[{head} {}{close}", escape_code(value))?;
    Ok(())
}

/// A double-quoted argument with `"` and `\` escaped.
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", escape_with(s, b"\"\\"))
}

impl MarkupGenerator {
    fn tag(&mut self, w: &mut dyn Write, head: &str, children: &[Node]) -> Result<Visit> {
        write!(w, "[{head}")?;
        if !children.is_empty() {
            w.write_all(b" ")?;
        }
        Ok(Visit::children("]"))
    }
}

impl Generator for MarkupGenerator {
    fn root(&mut self, w: &mut dyn Write, node: &Root) -> Result<()> {
        generate_all(w, &node.children, self)
    }

    fn text(&mut self, w: &mut dyn Write, node: &Text) -> Result<()> {
        w.write_all(escape_text(&node.value).as_bytes())?;
        Ok(())
    }

    fn bold(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.tag(w, "b", &node.children)
    }

    fn italic(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.tag(w, "i", &node.children)
    }

    fn underline(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.tag(w, "u", &node.children)
    }

    fn sup(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.tag(w, "sup", &node.children)
    }

    fn sub(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.tag(w, "sub", &node.children)
    }

    fn link(&mut self, w: &mut dyn Write, node: &Link) -> Result<Visit> {
        self.tag(w, &format!("a={}", escape_arg(&node.href)), &node.children)
    }

    fn image(&mut self, w: &mut dyn Write, node: &Image) -> Result<()> {
        write!(w, "[img={}]", escape_arg(&node.src))?;
        Ok(())
    }

    fn code(&mut self, w: &mut dyn Write, node: &Code) -> Result<()> {
        if node.value.is_empty() {
            w.write_all(b"[code][/code]")?;
            return Ok(());
        }
        code_body(w, "code", &node.value, "[/code]")
    }

    fn code_in(&mut self, w: &mut dyn Write, node: &CodeIn) -> Result<()> {
        let head = format!("codein {}", quoted(&node.language));
        code_body(w, &head, &node.value, "[/codein]")
    }

    fn quote(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.tag(w, "quote", &node.children)
    }

    fn quote_of(&mut self, w: &mut dyn Write, node: &QuoteOf) -> Result<Visit> {
        self.tag(w, &format!("quoteof {}", quoted(&node.name)), &node.children)
    }

    fn spoiler(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.tag(w, "spoiler", &node.children)
    }

    fn indent(&mut self, w: &mut dyn Write, node: &Element) -> Result<Visit> {
        self.tag(w, "indent", &node.children)
    }

    fn hr(&mut self, w: &mut dyn Write, _: &Hr) -> Result<()> {
        w.write_all(b"[hr]")?;
        Ok(())
    }

    fn custom(&mut self, w: &mut dyn Write, node: &Custom) -> Result<Visit> {
        self.tag(w, &escape_arg(&node.tag), &node.children)
    }
}

#[cfg(test)]
mod tests {
    use crate::generate::to_markup;
    use crate::parse_str;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn canonical(input: &str) -> String {
        to_markup(&parse_str(input).unwrap()).unwrap()
    }

    #[rstest]
    #[case("[* Bold [/ Italic]] plain", "[b Bold [i Italic]] plain")]
    #[case("[url=http://x label]", "[a=http://x label]")]
    #[case("[link http://x]", "[a=http://x]")]
    #[case("[image a.png]", "[img=a.png]")]
    #[case("[q [sp x]][indent y][HR]", "[quote [spoiler x]][indent y][hr]")]
    #[case("[^ a][. b][_ c]", "[sup a][sub b][u c]")]
    #[case("[b unclosed", "[b unclosed]")]
    #[case("[marquee=fast wee]", "[marquee fast wee]")]
    #[case(r"a\[b\]c=d*e/f_g\\h", r"a\[b\]c\=d\*e\/f\_g\\h")]
    #[case(r#"[quoteof "say \"hi\"" x]"#, r#"[quoteof "say \"hi\"" x]"#)]
    #[case(r#"[codein=go a[1]]"#, r#"[codein "go" a\[1\]]"#)]
    #[case(r"[code C:\]path]", r"[code C:\]path]")]
    #[case("[code][/code]", "[code][/code]")]
    #[case("[code a[b[/code]", r"[code a\[b[/code]")]
    #[case(r#"[codein "c" x[[/codein]"#, r#"[codein "c" x\[[/codein]"#)]
    #[case("[b]", "[b]")]
    fn canonical_form(#[case] input: &str, #[case] want: &str) {
        assert_eq!(canonical(input), want);
    }

    #[rstest]
    #[case("[b Bold [i Italic]] plain")]
    #[case(r#"[quoteof "a \\ b" [img=x\ y.png] [code [nested] \\ ]]"#)]
    #[case("[link http://x/a=b [b y]]\n[hr]")]
    #[case("[zz\\] weird]")]
    #[case("[code open [ never closed")]
    #[case("[code a]b]")]
    fn reserializing_is_stable(#[case] input: &str) {
        let once = canonical(input);
        assert_eq!(canonical(&once), once);
    }
}
