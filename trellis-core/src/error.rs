//! Scan failure taxonomy and diagnostic formatting.
//!
//! Every failure in this crate is one of a small closed set of kinds. A
//! failure raised against a live [`Stream`](crate::Stream) carries a context
//! snippet - the last few characters up to and including the cursor - so the
//! driver can show where the scan stopped without re-slicing the input.

use thiserror::Error;

/// The closed set of scan failure kinds.
///
/// All are fatal to the in-progress primitive call; the caller propagates
/// them outward with `?`. There is no retry or recovery inside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A primitive needed at least one more character than remains.
    #[error("Unexpected end of input.")]
    EndOfInput,

    /// The character at the cursor cannot start or continue the required
    /// token.
    #[error("Unexpected \"{0}\".")]
    UnexpectedCharacter(char),

    /// A quoted literal ran out of input before its closing quote.
    #[error("Unterminated string (expected {0}).")]
    UnterminatedString(char),

    /// None of an enumerated candidate list matched at the cursor.
    #[error("Expected {}.", join_candidates(.0))]
    ExpectedSymbol(Vec<String>),
}

/// A scan failure, optionally annotated with source context.
///
/// Rendered as `<message> @ "<context>" <-` when context is present. The
/// context is at most 31 characters preceding the cursor plus the character
/// at the cursor itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.kind, .context))]
pub struct ParseError {
    pub kind: ErrorKind,
    pub context: Option<String>,
}

impl ParseError {
    /// A failure with no stream context attached.
    pub fn new(kind: ErrorKind) -> Self {
        ParseError { kind, context: None }
    }

    pub(crate) fn with_context(kind: ErrorKind, context: String) -> Self {
        ParseError {
            kind,
            context: Some(context),
        }
    }
}

fn render(kind: &ErrorKind, context: &Option<String>) -> String {
    match context {
        Some(ctx) => format!("{} @ \"{}\" <-", kind, ctx),
        None => kind.to_string(),
    }
}

fn join_candidates(symbols: &[String]) -> String {
    symbols
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(" or ")
}
