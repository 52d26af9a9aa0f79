//! Tag recognition for the tree parser.

use std::io::BufRead;

use super::Stream;
use crate::ast::{Code, CodeIn, Custom, Element, Hr, Image, Link, Node, QuoteOf, Span};
use crate::error::Result;
use crate::grammar::{CODE_TERMINATORS, CODEIN_TERMINATORS, Command};

impl<R: BufRead> Stream<R> {
    /// Handles a tag whose `[` sits at `start`.
    ///
    /// Leaf tags are completed immediately; containers are pushed and stay
    /// open until a `]` or end of input.
    pub(super) fn open_tag(&mut self, start: usize) -> Result<()> {
        let word = self.scanner.read_token(true)?;
        let command = Command::from_word(&word);
        let opened = Span::new(start, start);

        let container = match command {
            Command::Image => {
                self.scanner.skip_arg_prefix()?;
                let src = self.scanner.read_token(false)?;
                self.consume_close()?;
                let span = Span::new(start, self.scanner.pos());
                self.complete(Node::Image(Image { span, src }));
                return Ok(());
            }
            Command::Hr => {
                self.consume_close()?;
                let span = Span::new(start, self.scanner.pos());
                self.complete(Node::Hr(Hr { span }));
                return Ok(());
            }
            Command::Code => {
                self.scanner.skip_arg_prefix()?;
                // `[code]body[/code]`
                self.consume_close()?;
                let inner_start = self.scanner.pos();
                let body = self.scanner.read_code_body(CODE_TERMINATORS)?;
                self.complete(Node::Code(Code {
                    span: Span::new(start, self.scanner.pos()),
                    inner: Span::new(inner_start, body.inner_end),
                    value: body.value,
                }));
                return Ok(());
            }
            Command::CodeIn => {
                self.scanner.skip_arg_prefix()?;
                let language = self.scanner.read_arg()?;
                self.scanner.skip_arg_prefix()?;
                let inner_start = self.scanner.pos();
                let body = self.scanner.read_code_body(CODEIN_TERMINATORS)?;
                self.complete(Node::CodeIn(CodeIn {
                    span: Span::new(start, self.scanner.pos()),
                    inner: Span::new(inner_start, body.inner_end),
                    language,
                    value: body.value,
                }));
                return Ok(());
            }
            Command::Link => {
                self.scanner.skip_arg_prefix()?;
                let href = self.scanner.read_token(false)?;
                Node::Link(Link {
                    span: opened,
                    href,
                    is_block: false,
                    is_immediate_close: false,
                    children: Vec::new(),
                })
            }
            Command::QuoteOf => {
                self.scanner.skip_arg_prefix()?;
                let name = self.scanner.read_arg()?;
                Node::QuoteOf(QuoteOf {
                    span: opened,
                    name,
                    children: Vec::new(),
                })
            }
            Command::Custom => Node::Custom(Custom {
                span: opened,
                tag: word,
                children: Vec::new(),
            }),
            Command::Bold => Node::Bold(element(opened)),
            Command::Italic => Node::Italic(element(opened)),
            Command::Underline => Node::Underline(element(opened)),
            Command::Sup => Node::Sup(element(opened)),
            Command::Sub => Node::Sub(element(opened)),
            Command::Quote => Node::Quote(element(opened)),
            Command::Spoiler => Node::Spoiler(element(opened)),
            Command::Indent => Node::Indent(element(opened)),
        };

        self.scanner.skip_arg_prefix()?;
        self.push_open(container);
        Ok(())
    }

    /// Consumes a `]` if it is the next byte.
    fn consume_close(&mut self) -> Result<()> {
        if self.scanner.peek()? == Some(b']') {
            self.scanner.read_byte()?;
        }
        Ok(())
    }
}

fn element(span: Span) -> Element {
    Element {
        span,
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Node;
    use crate::parse_str;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn only(input: &str) -> Node {
        let mut root = parse_str(input).unwrap();
        assert_eq!(root.children.len(), 1, "expected one node for {input:?}");
        root.children.remove(0)
    }

    #[rstest]
    #[case("[* x]", "Bold")]
    #[case("[/ x]", "Italic")]
    #[case("[_ x]", "Underline")]
    #[case("[^ x]", "Sup")]
    #[case("[. x]", "Sub")]
    #[case("[sup x]", "Sup")]
    #[case("[q x]", "Quote")]
    #[case("[sp x]", "Spoiler")]
    #[case("[indent x]", "Indent")]
    #[case("[url=http://x x]", "Link")]
    #[case("[image x]", "Image")]
    #[case("[HR]", "Hr")]
    #[case("[zzz x]", "Custom")]
    fn command_aliases_produce_nodes(#[case] input: &str, #[case] kind: &str) {
        assert_eq!(only(input).kind(), kind);
    }

    #[rstest]
    #[case("[img=a.png]", "a.png")]
    #[case("[img a.png]", "a.png")]
    #[case(r"[img=a\ b.png]", "a b.png")]
    fn image_argument_forms(#[case] input: &str, #[case] src: &str) {
        let Node::Image(image) = only(input) else {
            panic!("expected image");
        };
        assert_eq!(image.src, src);
    }

    #[test]
    fn container_prefix_skips_a_single_space() {
        let Node::Bold(bold) = only("[b  two]") else {
            panic!("expected bold");
        };
        let Node::Text(text) = &bold.children[0] else {
            panic!("expected text");
        };
        assert_eq!(text.value, " two");
    }

    #[test]
    fn empty_container() {
        let Node::Bold(bold) = only("[*]") else {
            panic!("expected bold");
        };
        assert!(bold.children.is_empty());
    }

    #[test]
    fn code_terminator_is_case_insensitive() {
        let Node::Code(code) = only("[code]x[/CODE]") else {
            panic!("expected code");
        };
        assert_eq!(code.value, "x");
    }

    #[test]
    fn codein_closing_tag() {
        let Node::CodeIn(code) = only("[codein=rust fn x() {}[/codein]") else {
            panic!("expected codein");
        };
        assert_eq!(code.language, "rust");
        assert_eq!(code.value, "fn x() {}");
    }

    #[test]
    fn unterminated_code_runs_to_end_of_input() {
        let Node::Code(code) = only("[code never [closed") else {
            panic!("expected code");
        };
        assert_eq!(code.value, "never [closed");
        assert_eq!(code.inner.end, 19);
    }
}
