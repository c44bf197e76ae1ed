//! Lexer
//!
//! This module is the context-free token layer: a logos lexer classifies the
//! raw source into comments, escaped characters, command names, the active
//! special characters, whitespace and word runs.
//!
//! Everything context-sensitive stays out of this layer on purpose. Where a
//! command's argument chain stops, where a paragraph breaks, and how far a
//! text run reaches all depend on lookahead success or failure, so they are
//! implemented as explicit functions over the token cursor in
//! [`crate::parsing`] rather than as token patterns here. This split keeps
//! the logos grammar plain (no custom callbacks, no lexer modes) and makes
//! the lookahead decisions testable as ordinary functions.
//!
//! Spans
//!
//!     `tokenize` returns `(RawToken, Range<usize>)` pairs whose spans are
//!     contiguous and cover every byte of the input; bytes logos rejects
//!     come through as `RawToken::Unknown` instead of being dropped. Total
//!     coverage is what makes the parser's span-tiling guarantee possible.

pub mod tokens;

pub use tokens::{tokenize, RawToken};
