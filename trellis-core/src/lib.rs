//! Trellis Core Scanner
//!
//! Lexical scanning toolkit for trellis, a line-oriented markup language
//! that translates into template markup. This crate provides the
//! mutable-cursor text stream and the token-reading primitives the tree
//! builder drives; assembling tokens into structured nodes, tag and filter
//! semantics, and the target template engine live in the layers above.
//!
//! # Architecture
//!
//! - **stream.rs** - the `Stream` cursor and the basic primitives
//!   (whitespace, indentation, lines, numbers, symbols, words, quoted
//!   strings)
//! - **expression.rs** - heuristic scanner for inline template expressions
//!   embedded in attribute markup
//! - **error.rs** - closed failure taxonomy with cursor-context diagnostics
//! - **tree.rs** - arena-backed generic ownership tree for node builders
//!
//! # Example
//!
//! ```
//! use trellis_core::Stream;
//!
//! let mut stream = Stream::new("%a{href: user.get_absolute_url()}");
//! let sigil = stream.read_symbol(&["%"]).unwrap();
//! let tag = stream.read_word(&[]).unwrap();
//! assert_eq!((sigil.as_str(), tag.as_str()), ("%", "a"));
//! ```

pub mod error;
mod expression;
pub mod stream;
pub mod tree;

pub use error::{ErrorKind, ParseError};
pub use stream::Stream;
pub use tree::{NodeId, Tree};
