//! The mutable-cursor text stream and its basic token-reading primitives.
//!
//! A [`Stream`] owns one document's text and a byte-offset cursor. Callers
//! drive a single stream through a sequence of primitive calls; each call
//! consumes one grammar fragment and returns an independently owned copy of
//! the consumed text. The cursor never moves backwards within a call, and is
//! left on the next unconsumed character on success (unchanged on a
//! zero-consumption failure).
//!
//! There is no internal synchronization: one stream belongs to one parse
//! job, and `&mut` access enforces the one-caller-at-a-time rule.
//!
//! Bounds safety inside each primitive is that primitive's responsibility.
//! Byte indexing is used wherever the probed characters are ASCII (quotes,
//! operators, plain whitespace); `char` decoding is used where Unicode
//! classes matter (words, indentation).

use std::fmt;

use memchr::memchr;
use tracing::trace;

use crate::error::{ErrorKind, ParseError};

/// Characters that open and close quoted literals.
pub(crate) const STRING_LITERALS: [char; 2] = ['"', '\''];

/// A mutable cursor over an immutable text buffer.
///
/// The sole point of shared mutable state in this crate. One instance per
/// document; discard it at end of parse or after the first unrecovered
/// failure (an abandoned mid-call cursor position is unspecified).
pub struct Stream {
    text: String,
    len: usize,
    cursor: usize,
}

impl Stream {
    /// Create a stream over a document, cursor at the start.
    pub fn new(text: impl Into<String>) -> Stream {
        let text = text.into();
        let len = text.len();
        Stream {
            text,
            len,
            cursor: 0,
        }
    }

    /// The backing text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current cursor position as a byte offset, always on a char boundary.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total length of the backing text in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the backing text is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the cursor has consumed all input.
    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.len
    }

    /// The character at the cursor, if any input remains.
    pub fn peek(&self) -> Option<char> {
        self.char_at(self.cursor)
    }

    /// Fails with `EndOfInput` if no input remains. Pure validation.
    pub fn expect_input(&self) -> Result<(), ParseError> {
        if self.cursor >= self.len {
            return Err(self.error(ErrorKind::EndOfInput));
        }
        Ok(())
    }

    /// A failure naming the character at the cursor as unexpected.
    ///
    /// Degrades to `EndOfInput` when nothing remains.
    pub fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(ch) => self.error(ErrorKind::UnexpectedCharacter(ch)),
            None => self.error(ErrorKind::EndOfInput),
        }
    }

    /// Construct a failure annotated with the context snippet at the cursor.
    pub(crate) fn error(&self, kind: ErrorKind) -> ParseError {
        trace!(cursor = self.cursor, kind = %kind, "scan failure");
        ParseError::with_context(kind, self.context_snippet())
    }

    /// Up to 31 characters preceding the cursor plus the character at the
    /// cursor, clamped at both ends of the buffer.
    fn context_snippet(&self) -> String {
        let start = self.text[..self.cursor]
            .char_indices()
            .rev()
            .take(31)
            .last()
            .map(|(idx, _)| idx)
            .unwrap_or(self.cursor);
        let end = match self.peek() {
            Some(ch) => self.cursor + ch.len_utf8(),
            None => self.len,
        };
        self.text[start..end].to_string()
    }

    /// Decode the character starting at a byte offset.
    pub(crate) fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos..).and_then(|rest| rest.chars().next())
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Advance the cursor past one decoded character.
    pub(crate) fn advance(&mut self, ch: char) {
        self.cursor += ch.len_utf8();
    }

    // ------------------------------------------------------------------
    // Basic primitives
    // ------------------------------------------------------------------

    /// Consume a maximal run of space/tab, plus `\r`/`\n` when
    /// `include_newlines` is set.
    ///
    /// Returns the consumed text, possibly empty. Never fails; a second
    /// consecutive call always returns the empty string.
    pub fn read_whitespace(&mut self, include_newlines: bool) -> String {
        let start = self.cursor;

        while self.cursor < self.len {
            let b = self.bytes()[self.cursor];
            let matched =
                matches!(b, b' ' | b'\t') || (include_newlines && matches!(b, b'\r' | b'\n'));
            if !matched {
                break;
            }
            self.cursor += 1;
        }

        self.text[start..self.cursor].to_string()
    }

    /// Count leading whitespace from the cursor (assumed to sit at a line
    /// start) without consuming anything.
    ///
    /// Returns `None` when a newline is reached first - a blank line. A
    /// final line that is all whitespace with no trailing newline also
    /// counts as blank.
    pub fn peek_indentation(&self) -> Option<usize> {
        let mut indentation = 0;
        let mut pos = self.cursor;

        while let Some(ch) = self.char_at(pos) {
            if ch == '\n' {
                return None;
            }
            if !ch.is_whitespace() {
                return Some(indentation);
            }
            indentation += 1;
            pos += ch.len_utf8();
        }

        None
    }

    /// Consume text to the next newline (exclusive), consuming the newline
    /// itself when present.
    ///
    /// Returns `None` when the cursor is already at end of input.
    pub fn read_line(&mut self) -> Option<String> {
        if self.cursor >= self.len {
            return None;
        }

        match memchr(b'\n', &self.bytes()[self.cursor..]) {
            Some(offset) => {
                let line = self.text[self.cursor..self.cursor + offset].to_string();
                self.cursor += offset + 1;
                Some(line)
            }
            None => {
                let line = self.text[self.cursor..].to_string();
                self.cursor = self.len;
                Some(line)
            }
        }
    }

    /// Consume a maximal run of ASCII digits and `.`.
    ///
    /// Returned verbatim with no decimal validity check (`3.14.15` is
    /// accepted as-is). Never fails, may return empty.
    pub fn read_number(&mut self) -> String {
        let start = self.cursor;

        while self.cursor < self.len {
            let b = self.bytes()[self.cursor];
            if !b.is_ascii_digit() && b != b'.' {
                break;
            }
            self.cursor += 1;
        }

        self.text[start..self.cursor].to_string()
    }

    /// Consume the first candidate that matches exactly at the cursor.
    ///
    /// Candidate order determines precedence: when one candidate is a
    /// prefix of another, callers must list the longer one first or it can
    /// never match. Fails with `ExpectedSymbol` listing every candidate
    /// when none match.
    pub fn read_symbol(&mut self, symbols: &[&str]) -> Result<String, ParseError> {
        for symbol in symbols {
            if self.text[self.cursor..].starts_with(*symbol) {
                self.cursor += symbol.len();
                return Ok((*symbol).to_string());
            }
        }

        Err(self.error(ErrorKind::ExpectedSymbol(
            symbols.iter().map(|s| (*s).to_string()).collect(),
        )))
    }

    /// Consume a maximal run of alphanumeric/underscore characters plus any
    /// character listed in `include_chars`.
    ///
    /// Fails with `EndOfInput` up front when nothing remains, and with
    /// `UnexpectedCharacter` when zero characters were consumed.
    pub fn read_word(&mut self, include_chars: &[char]) -> Result<String, ParseError> {
        self.expect_input()?;

        let start = self.cursor;

        while let Some(ch) = self.peek() {
            if !(ch.is_alphanumeric() || ch == '_' || include_chars.contains(&ch)) {
                break;
            }
            self.advance(ch);
        }

        // an immediate non-word character is raised as unexpected
        if self.cursor == start {
            return Err(self.unexpected());
        }

        Ok(self.text[start..self.cursor].to_string())
    }

    /// Consume a single- or double-quoted string, returning the decoded
    /// value without the quotes.
    ///
    /// The cursor must sit at the opening quote. The closing quote is the
    /// first matching quote whose immediately preceding raw byte is not a
    /// backslash - a shallow check, not a true escape scanner, so a doubled
    /// backslash before a quote is mis-read as an escape. Fails with
    /// `UnterminatedString` (cursor parked at end of input) when no close
    /// is found. On success the cursor lands just past the closing quote.
    pub fn read_quoted_string(&mut self) -> Result<String, ParseError> {
        let terminator = match self.peek() {
            Some(ch) => ch,
            None => return Err(self.error(ErrorKind::EndOfInput)),
        };
        assert!(
            STRING_LITERALS.contains(&terminator),
            "read_quoted_string called with cursor off a quote"
        );

        let start = self.cursor;
        let mut pos = self.cursor + 1; // past the opening quote

        loop {
            match memchr(terminator as u8, &self.bytes()[pos..]) {
                Some(offset) => {
                    let at = pos + offset;
                    if self.bytes()[at - 1] != b'\\' {
                        self.cursor = at + 1; // past the closing quote
                        break;
                    }
                    pos = at + 1;
                }
                None => {
                    self.cursor = self.len;
                    return Err(self.error(ErrorKind::UnterminatedString(terminator)));
                }
            }
        }

        Ok(unescape(&self.text[start + 1..self.cursor - 1]))
    }
}

/// Interpret escape sequences in the raw body of a quoted literal.
///
/// Handles the sequences this markup uses: `\n \t \r \0 \\ \' \"`, plus
/// `\xHH` and `\uHHHH`. Any other escape is kept verbatim, backslash
/// included.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('x') => push_coded(&mut out, &mut chars, 'x', 2),
            Some('u') => push_coded(&mut out, &mut chars, 'u', 4),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Decode a fixed-width hex escape, falling back to the verbatim text when
/// the digits are malformed.
fn push_coded(out: &mut String, chars: &mut std::str::Chars<'_>, marker: char, width: usize) {
    let digits: String = chars.clone().take(width).collect();
    let decoded = if digits.chars().count() == width {
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
    } else {
        None
    };

    match decoded {
        Some(ch) => {
            out.push(ch);
            for _ in 0..width {
                chars.next();
            }
        }
        None => {
            out.push('\\');
            out.push(marker);
        }
    }
}

impl fmt::Debug for Stream {
    /// Renders the consumed and remaining halves around the cursor, with
    /// newlines escaped for one-line output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" >> \"{}\"",
            self.text[..self.cursor].replace('\n', "\\n"),
            self.text[self.cursor..].replace('\n', "\\n"),
        )
    }
}
