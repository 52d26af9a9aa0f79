//! # a4code
//!
//! A parser and renderer for a4code, a small bracket-tag markup language:
//!
//! ```text
//! [b bold [i and italic]] [link https://example.com a link] [quoteof "bob" hi]
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//!                ┌──────────── Scanner ────────────┐
//!                │ escapes, arguments, code bodies │
//!                └───────┬─────────────────┬───────┘
//!                        │                 │
//!               Stream (parser)     A4code2Html (convert)
//!                        │                 │
//!                    Root tree        HTML in one pass
//!                        │
//!          Generator: HTML, text, a4code, Markdown
//! ```
//!
//! Both drivers share the [`scanner`] and the command table in [`grammar`], so
//! they agree on escapes, aliases and where code bodies end.
//!
//! ### Parsing ([`parser`])
//!
//! [`parse`] builds a [`Root`](ast::Root) whose nodes carry absolute byte
//! offsets. [`stream`] yields nodes as they complete. Open tags live on an
//! explicit stack, so deeply nested input cannot exhaust the call stack, and
//! tags still open at end of input are closed there.
//!
//! ```
//! use a4code::generate::{HtmlOptions, to_html};
//!
//! let root = a4code::parse_str("[b bold").unwrap();
//! let html = to_html(&root, &HtmlOptions::default().without_source_positions()).unwrap();
//! assert_eq!(html, "<strong>bold</strong>");
//! ```
//!
//! ### Rendering ([`generate`])
//!
//! A [`Generator`](generate::Generator) has one method per node variant.
//! [`generate::generate`] walks a tree with an explicit stack and dispatches
//! each node to it. Trees drop and clone without recursion too, so any depth
//! the parser accepts can also be rendered and released.
//!
//! ### Single-pass conversion ([`convert`])
//!
//! [`A4code2Html`](convert::A4code2Html) turns markup into HTML (or stripped
//! text) without building a tree, with link rendering delegated to a
//! [`LinkProvider`](convert::LinkProvider).
//!
//! ### Utilities
//!
//! - [`substring`]: cut a range of visible text, keeping the markup around it.
//! - [`snip`]: shorten the plain text of a post.
//! - [`quote`]: wrap text in `[quoteof …]` blocks for replies.

pub mod ast;
pub mod convert;
mod error;
pub mod generate;
pub mod grammar;
pub mod metadata;
pub mod parser;
pub mod quote;
pub mod scanner;
pub mod snip;
pub mod substring;
pub mod url;

pub use error::{Error, Result};
pub use parser::{Stream, StreamOptions, parse, parse_nodes, parse_nodes_str, parse_str, stream};
