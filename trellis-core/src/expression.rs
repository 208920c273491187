//! Heuristic scanner for inline template expressions embedded in markup.
//!
//! Attribute values in trellis markup may hold fragments of the target
//! template language - identifier chains (`user.email`), comparisons
//! (`sort_by == "turnover"`), call-like syntax (`user.get_absolute_url()`).
//! The surrounding scan only needs the fragment's extent, never its
//! validity, so instead of a grammar this is a single-pass state machine:
//! greedy, with a whitespace lookahead to decide whether a space separates
//! operator operands or ends the fragment.
//!
//! The carried state is a paren nesting depth and an optional open-quote
//! character. They are separate fields rather than a three-variant state
//! enum because they overlap: a quote opened inside parentheses must
//! restore the nesting depth when it closes.
//!
//! Rule priority, per character:
//!
//! 1. inside a quote, consume unconditionally; the quote closes on an
//!    unescaped opener (shallow escape check, as for quoted strings);
//! 2. a quote character opens quote state;
//! 3. `(` deepens nesting, `)` shallows it; depth going negative means the
//!    `)` belongs to an enclosing construct and terminates the scan;
//! 4. at depth zero, `,` and `}` terminate;
//! 5. at depth zero, plain whitespace terminates unless the lookahead says
//!    an operator or operand follows;
//! 6. otherwise identifier characters, `.`, and operator characters are
//!    consumed; inside parentheses every character is.

use tracing::trace;

use crate::error::ParseError;
use crate::stream::STRING_LITERALS;
use crate::stream::Stream;

/// Scan state carried across one expression fragment.
#[derive(Debug, Clone, Copy, Default)]
struct ScanState {
    /// Paren nesting depth. Goes negative exactly once, on the terminating
    /// `)` of an enclosing construct.
    depth: i32,
    /// Opening quote character while inside a quoted literal.
    quote: Option<char>,
}

impl ScanState {
    fn quoting(&self) -> bool {
        self.quote.is_some()
    }

    fn nested(&self) -> bool {
        self.depth > 0
    }
}

impl Stream {
    /// Consume one embedded expression fragment, stopping at its boundary.
    ///
    /// Fails with `EndOfInput` when nothing remains and with
    /// `UnexpectedCharacter` when the first character cannot start a
    /// fragment. On success the cursor sits on the terminating character
    /// (or at end of input) and the returned text is trimmed of
    /// surrounding whitespace.
    pub fn read_expression(&mut self) -> Result<String, ParseError> {
        self.expect_input()?;

        let start = self.cursor();
        let mut state = ScanState::default();

        while let Some(ch) = self.peek() {
            // Quote state dominates every other rule.
            if let Some(opener) = state.quote {
                let at = self.cursor();
                self.advance(ch);
                if ch == opener && (at == 0 || self.bytes()[at - 1] != b'\\') {
                    state.quote = None;
                }
                continue;
            }

            if STRING_LITERALS.contains(&ch) {
                state.quote = Some(ch);
                self.advance(ch);
                continue;
            }

            if ch == '(' {
                state.depth += 1;
                self.advance(ch);
                continue;
            }
            if ch == ')' {
                state.depth -= 1;
                // this close belongs to an enclosing construct
                if state.depth < 0 {
                    break;
                }
                self.advance(ch);
                continue;
            }

            // Nesting overrides the comma/brace and whitespace boundaries.
            if !state.nested() && matches!(ch, ',' | '}') {
                break;
            }

            if !state.nested() && matches!(ch, ' ' | '\t') {
                if self.continues_past_whitespace() {
                    self.advance(ch);
                    continue;
                }
                break;
            }

            let accepted = ch.is_alphanumeric()
                || ch == '_'
                || ch == '.'
                || state.nested()
                || matches!(ch, '=' | '!' | '<' | '>')
                || matches!(ch, ' ' | '\t');
            if !accepted {
                break;
            }
            self.advance(ch);
        }

        debug_assert!(!state.quoting() || self.is_at_end());

        if self.cursor() == start {
            return Err(self.unexpected());
        }

        let fragment = self.text()[start..self.cursor()].trim().to_string();
        trace!(start, end = self.cursor(), %fragment, "expression fragment scanned");
        Ok(fragment)
    }

    /// Look ahead past a run of spaces/tabs to decide whether the fragment
    /// continues on the other side.
    ///
    /// It does when the next significant text is a two-character comparison
    /// operator, or starts with `<`, `>`, a quote, or a digit, or with an
    /// identifier character (letter or underscore - any identifier is
    /// accepted, there is no keyword allow-list). End of input after the
    /// whitespace is a boundary.
    fn continues_past_whitespace(&self) -> bool {
        let bytes = self.bytes();
        let mut pos = self.cursor() + 1;
        while pos < self.len() && matches!(bytes[pos], b' ' | b'\t') {
            pos += 1;
        }
        if pos >= self.len() {
            return false;
        }

        if pos + 1 < self.len() && matches!(&bytes[pos..pos + 2], b"==" | b"!=" | b"<=" | b">=") {
            return true;
        }

        match self.char_at(pos) {
            Some(next) => {
                matches!(next, '<' | '>' | '"' | '\'')
                    || next.is_ascii_digit()
                    || next.is_alphabetic()
                    || next == '_'
            }
            None => false,
        }
    }
}
