//! # ctxt
//!
//! A parser for the ConTeXt markup language.
//!
//! ConTeXt is a TeX-family macro language, and the hard part of parsing it is
//! that nothing carries a statically-knowable terminator. A command's argument
//! chain (`\name[..][k=v]{scope}`) ends wherever lookahead says it ends;
//! environments are `\start<name>`/`\stop<name>` pairs over free-form
//! identifiers; and inline math and raw language inclusions nest in the same
//! character stream with their own lexical rules.
//!
//! The crate is organized as a small pipeline:
//!
//! - [`lexing`] tokenizes the raw source with a logos lexer into a flat
//!   `Vec<(RawToken, Range<usize>)>` whose spans cover every input byte.
//! - [`parsing`] composes those tokens into the document tree with a
//!   hand-written recursive descent parser. The context-sensitive decisions
//!   (where a command stops, where a paragraph breaks, how far a text run
//!   reaches) live here as ordinary lookahead functions, not grammar tables.
//! - [`ast`] holds the node types. Every node carries its byte span so that
//!   editor tooling can map the tree back onto the buffer.
//!
//! Parsing is best-effort by design: malformed input degrades to the most
//! specific node still assignable (usually text), unterminated groups close
//! implicitly at end of input with a [`Diagnostic`], and the only hard error
//! is a language inclusion whose body scan does not land on its stop
//! delimiter.
//!
//! ```text
//! let outcome = ctxt::parse("\\starttext Hello \\stoptext")?;
//! assert!(outcome.document.preamble.is_some());
//! ```
//!
//! For testing guidelines see the [testing module](crate::testing); parser
//! tests assert on the AST and on span reconstruction, never on debug dumps.

pub mod ast;
pub mod lexing;
pub mod parsing;
pub mod testing;

pub use ast::diagnostics::{Diagnostic, DiagnosticKind, ParseError};
pub use ast::elements::{
    BraceGroup, Command, CommandBlock, CommandGroup, ContentItem, Document, Escaped, Inclusion,
    InlineMath, LineComment, Marker, OptionBlock, SettingsBlock, SubLanguage, TextBlock,
};
pub use parsing::{parse, ParseOutcome};
