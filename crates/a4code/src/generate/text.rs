use std::io::Write;

use super::{Generator, Visit, generate_all};
use crate::ast::{Code, CodeIn, Custom, Element, Hr, Image, Link, QuoteOf, Root, Text};
use crate::error::Result;

/// Emits the value of every text node and nothing else.
///
/// Code bodies, images and rules contribute nothing; links, quotes and unknown
/// tags contribute only their children.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextGenerator;

impl Generator for TextGenerator {
    fn root(&mut self, w: &mut dyn Write, node: &Root) -> Result<()> {
        generate_all(w, &node.children, self)
    }

    fn text(&mut self, w: &mut dyn Write, node: &Text) -> Result<()> {
        w.write_all(node.value.as_bytes())?;
        Ok(())
    }

    fn bold(&mut self, _: &mut dyn Write, _: &Element) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn italic(&mut self, _: &mut dyn Write, _: &Element) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn underline(&mut self, _: &mut dyn Write, _: &Element) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn sup(&mut self, _: &mut dyn Write, _: &Element) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn sub(&mut self, _: &mut dyn Write, _: &Element) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn link(&mut self, _: &mut dyn Write, _: &Link) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn image(&mut self, _: &mut dyn Write, _: &Image) -> Result<()> {
        Ok(())
    }

    fn code(&mut self, _: &mut dyn Write, _: &Code) -> Result<()> {
        Ok(())
    }

    fn code_in(&mut self, _: &mut dyn Write, _: &CodeIn) -> Result<()> {
        Ok(())
    }

    fn quote(&mut self, _: &mut dyn Write, _: &Element) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn quote_of(&mut self, _: &mut dyn Write, _: &QuoteOf) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn spoiler(&mut self, _: &mut dyn Write, _: &Element) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn indent(&mut self, _: &mut dyn Write, _: &Element) -> Result<Visit> {
        Ok(Visit::children(""))
    }

    fn hr(&mut self, _: &mut dyn Write, _: &Hr) -> Result<()> {
        Ok(())
    }

    fn custom(&mut self, _: &mut dyn Write, _: &Custom) -> Result<Visit> {
        Ok(Visit::children(""))
    }
}

#[cfg(test)]
mod tests {
    use crate::generate::to_text;
    use crate::parse_str;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("[b Bold [i Italic]] plain", "Bold Italic plain")]
    #[case("a[img=x.png]b[hr]c", "abc")]
    #[case("[code not text] after", " after")]
    #[case("[link http://x label]", "label")]
    #[case("[link http://x]", "")]
    #[case(r#"[quoteof "bob" said [zz hi]]"#, "said hi")]
    #[case(r"esc\[aped\]", "esc[aped]")]
    fn strips_markup(#[case] input: &str, #[case] want: &str) {
        assert_eq!(to_text(&parse_str(input).unwrap()).unwrap(), want);
    }
}
