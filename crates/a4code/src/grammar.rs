//! The fixed a4code tag set.
//!
//! Both the tree parser and the single-pass converter resolve command words
//! through [`Command::from_word`], so aliases stay in one place.

/// Terminators of a `[code …]` body besides an unmatched `]`.
pub const CODE_TERMINATORS: &[&[u8]] = &[b"[/code]"];

/// Terminators of a `[codein …]` body besides an unmatched `]`.
pub const CODEIN_TERMINATORS: &[&[u8]] = &[b"[/codein]"];

/// A recognized command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Bold,
    Italic,
    Underline,
    Sup,
    Sub,
    Image,
    Link,
    Code,
    CodeIn,
    QuoteOf,
    Quote,
    Spoiler,
    Indent,
    Hr,
    /// Anything outside the fixed set.
    Custom,
}

impl Command {
    /// Resolves a command word case-insensitively.
    pub fn from_word(word: &str) -> Self {
        match word.to_ascii_lowercase().as_str() {
            "*" | "b" | "bold" => Command::Bold,
            "/" | "i" | "italic" => Command::Italic,
            "_" | "u" | "underline" => Command::Underline,
            "^" | "p" | "power" | "sup" => Command::Sup,
            "." | "s" | "sub" => Command::Sub,
            "img" | "image" => Command::Image,
            "a" | "link" | "url" => Command::Link,
            "code" => Command::Code,
            "codein" => Command::CodeIn,
            "quoteof" => Command::QuoteOf,
            "quote" | "q" => Command::Quote,
            "spoiler" | "sp" => Command::Spoiler,
            "indent" => Command::Indent,
            "hr" => Command::Hr,
            _ => Command::Custom,
        }
    }

    /// Leaf tags are complete as soon as their argument is read; the rest stay
    /// open until a closing `]`.
    pub fn is_leaf(self) -> bool {
        matches!(self, Command::Image | Command::Code | Command::CodeIn | Command::Hr)
    }
}
