//! Parser
//!
//! Recursive descent over the token stream produced by [`crate::lexing`],
//! composing the document tree with explicit ordered choice. Each "prefer X
//! over Y" rule of the grammar is a plain if/else chain in source order, and
//! failure of an attempt is an ordinary `None`/restore-the-cursor, never an
//! unwind, which keeps every precedence decision visible and testable.
//!
//! The module splits along the grammar's own seams:
//!
//! - `parser.rs`: document areas, content composition, groups, math, text
//!   runs and paragraph splitting.
//! - `blocks.rs`: the command argument chain, meaning the command-stop
//!   lookahead, backtracking block attempts, and the option/settings/empty
//!   classification with its recursive setting values.
//! - `inclusions.rs`: fixed-table recognition of injected-language
//!   regions and their verbatim body capture.
//!
//! Robustness contract: for any input that contains no inclusion opener the
//! parser must produce a tree. Lookahead failures backtrack silently,
//! unterminated groups close at end of input with a diagnostic, and stray
//! closers degrade to commands or text. The single hard error is an
//! inclusion body that does not reach its stop delimiter.

pub mod blocks;
pub mod inclusions;
pub mod parser;

use crate::ast::diagnostics::{Diagnostic, ParseError};
use crate::ast::elements::Document;

/// A best-effort tree plus everything non-fatal the parser noticed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a complete ConTeXt document.
pub fn parse(source: &str) -> Result<ParseOutcome, ParseError> {
    let mut parser = parser::Parser::new(source);
    let document = parser.parse_document()?;
    Ok(ParseOutcome {
        document,
        diagnostics: parser.into_diagnostics(),
    })
}
