//! Byte-level cursor over a buffered reader.
//!
//! The scanner is shared by the tree-building parser and the single-pass
//! HTML converter so both resolve escapes, arguments and code bodies the same
//! way.

use std::collections::VecDeque;
use std::io::{BufRead, ErrorKind};

use crate::error::{Error, Result};

/// Bytes that lose their markup meaning when preceded by a backslash.
pub const ESCAPABLE: &[u8] = b" []=\\*/_";

/// Returns true if `b` may follow a backslash to be taken literally.
pub fn is_escapable(b: u8) -> bool {
    ESCAPABLE.contains(&b)
}

/// Converts accumulated bytes into a `String`, replacing invalid UTF-8.
pub(crate) fn into_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// The raw body of a `code` or `codein` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBody {
    /// Body with escapes resolved and the terminator stripped.
    pub value: String,
    /// Absolute offset where the body ends (start of the terminator, or end of input).
    pub inner_end: usize,
}

/// A cursor over a byte stream with lookahead, one byte of pushback and an
/// absolute position counter.
pub struct Scanner<R> {
    inner: R,
    lookahead: VecDeque<u8>,
    /// Absolute byte offset of the next byte to be read.
    pos: usize,
    /// The most recently read byte, available for a single unread.
    last: Option<u8>,
    exhausted: bool,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookahead: VecDeque::new(),
            pos: 0,
            last: None,
            exhausted: false,
        }
    }

    /// Returns the absolute byte position of the next unread byte.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns true once the underlying reader is drained and no lookahead remains.
    pub fn reached_eof(&self) -> bool {
        self.exhausted && self.lookahead.is_empty()
    }

    fn fill(&mut self, want: usize) -> Result<()> {
        while self.lookahead.len() < want && !self.exhausted {
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            };
            if buf.is_empty() {
                self.exhausted = true;
                break;
            }
            self.lookahead.extend(buf.iter().copied());
            let len = buf.len();
            self.inner.consume(len);
        }
        Ok(())
    }

    /// Reads one byte, returning `None` at end of input.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.lookahead.is_empty() {
            self.fill(1)?;
        }
        match self.lookahead.pop_front() {
            Some(b) => {
                self.pos += 1;
                self.last = Some(b);
                Ok(Some(b))
            }
            None => {
                self.last = None;
                Ok(None)
            }
        }
    }

    /// Pushes the most recently read byte back. Only one byte of pushback is
    /// available between reads.
    pub fn unread_byte(&mut self) -> Result<()> {
        let b = self.last.take().ok_or(Error::Unread)?;
        self.lookahead.push_front(b);
        self.pos -= 1;
        Ok(())
    }

    /// Returns the next byte without consuming it.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        self.fill(1)?;
        Ok(self.lookahead.front().copied())
    }

    /// Returns up to `n` upcoming bytes without consuming them. Fewer bytes are
    /// returned only when the input ends first.
    pub fn peek_n(&mut self, n: usize) -> Result<&[u8]> {
        self.fill(n)?;
        let bytes = self.lookahead.make_contiguous();
        Ok(&bytes[..n.min(bytes.len())])
    }

    /// Consumes `n` bytes, stopping early at end of input.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            if self.read_byte()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Consumes the byte after a backslash and appends its literal form.
    ///
    /// Escapable bytes replace the pair; any other byte keeps the backslash.
    pub fn read_escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
        match self.read_byte()? {
            None => out.push(b'\\'),
            Some(b) if is_escapable(b) => out.push(b),
            Some(b) => {
                out.push(b'\\');
                out.push(b);
            }
        }
        Ok(())
    }

    /// Reads a bare token up to `\n ] [ space \r` (and `=` when `stop_at_equal`
    /// is set). The delimiter is left unread.
    pub fn read_token(&mut self, stop_at_equal: bool) -> Result<String> {
        let mut out = Vec::new();
        while let Some(b) = self.read_byte()? {
            match b {
                b'\n' | b']' | b'[' | b' ' | b'\r' => {
                    self.unread_byte()?;
                    break;
                }
                b'=' if stop_at_equal => {
                    self.unread_byte()?;
                    break;
                }
                b'\\' => self.read_escape(&mut out)?,
                _ => out.push(b),
            }
        }
        Ok(into_string(out))
    }

    /// Reads a `"quoted value"` when the next byte is a double quote, otherwise
    /// a bare token.
    pub fn read_arg(&mut self) -> Result<String> {
        if self.peek()? != Some(b'"') {
            return self.read_token(false);
        }
        self.read_byte()?;
        let mut out = Vec::new();
        while let Some(b) = self.read_byte()? {
            match b {
                b'"' => break,
                b'\\' => match self.read_byte()? {
                    None => out.push(b'\\'),
                    Some(n) if n == b'"' || is_escapable(n) => out.push(n),
                    Some(n) => {
                        out.push(b'\\');
                        out.push(n);
                    }
                },
                _ => out.push(b),
            }
        }
        Ok(into_string(out))
    }

    /// Consumes a single space or `=` separating a command from its argument.
    pub fn skip_arg_prefix(&mut self) -> Result<bool> {
        match self.peek()? {
            Some(b' ' | b'=') => {
                self.read_byte()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Consumes spaces, tabs and line breaks, returning how many were skipped.
    pub fn skip_whitespace(&mut self) -> Result<usize> {
        let mut n = 0;
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek()? {
            self.read_byte()?;
            n += 1;
        }
        Ok(n)
    }

    /// Scans a raw code body.
    ///
    /// Bytes are copied through verbatim except `\[`, `\]` and `\\`, which
    /// unescape. The body ends at the first terminator matched
    /// case-insensitively, or at a `]` that closes no bracket opened inside the
    /// body. Escaped brackets still open and close nested brackets but never
    /// end the body or form part of a terminator. At end of input the whole
    /// buffer is returned.
    pub fn read_code_body(&mut self, terminators: &[&[u8]]) -> Result<CodeBody> {
        let mut buf = Vec::new();
        let mut literal_from = 0;
        let mut depth = 0usize;
        loop {
            let Some(b) = self.read_byte()? else {
                return Ok(CodeBody {
                    value: into_string(buf),
                    inner_end: self.pos,
                });
            };
            if b == b'\\' {
                match self.read_byte()? {
                    None => buf.push(b'\\'),
                    Some(n @ (b'[' | b']' | b'\\')) => {
                        match n {
                            b'[' => depth += 1,
                            b']' => depth = depth.saturating_sub(1),
                            _ => {}
                        }
                        buf.push(n);
                    }
                    Some(n) => {
                        buf.push(b'\\');
                        buf.push(n);
                    }
                }
                literal_from = buf.len();
                continue;
            }
            buf.push(b);

            let literal = &buf[literal_from..];
            if let Some(t) = terminators.iter().find(|t| ends_with_ignore_case(literal, t)) {
                buf.truncate(buf.len() - t.len());
                return Ok(CodeBody {
                    value: into_string(buf),
                    inner_end: self.pos - t.len(),
                });
            }

            match b {
                b'[' => depth += 1,
                b']' if depth == 0 => {
                    buf.pop();
                    return Ok(CodeBody {
                        value: into_string(buf),
                        inner_end: self.pos - 1,
                    });
                }
                b']' => depth -= 1,
                _ => {}
            }
        }
    }
}

fn ends_with_ignore_case(haystack: &[u8], suffix: &[u8]) -> bool {
    haystack.len() >= suffix.len()
        && haystack[haystack.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}
