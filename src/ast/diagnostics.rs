//! Diagnostics and the hard parse error
//!
//!     The parser never aborts globally on malformed input: unterminated
//!     groups close implicitly at end of input and are reported through
//!     [`Diagnostic`] values on the parse outcome. The one hard failure is
//!     a language inclusion whose body scan lands on a backslash that does
//!     not begin the expected stop delimiter. Continuing past it would
//!     silently corrupt body-capture boundaries for everything after.

use crate::ast::elements::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard, localized parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The body scan of an inclusion stopped at a backslash that does not
    /// begin the expected stop delimiter.
    InclusionDelimiterMismatch {
        expected: String,
        found: String,
        at: usize,
    },
    /// End of input reached inside an inclusion body with no backslash to
    /// terminate the scan.
    UnterminatedInclusion { expected: String, at: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InclusionDelimiterMismatch {
                expected,
                found,
                at,
            } => write!(
                f,
                "expected inclusion stop delimiter `{}` at byte {}, found `{}`",
                expected, at, found
            ),
            ParseError::UnterminatedInclusion { expected, at } => write!(
                f,
                "inclusion starting at byte {} never reaches its stop delimiter `{}`",
                at, expected
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Non-fatal, best-effort findings attached to a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A `\start<name>` with no matching `\stop<name>` before end of input.
    UnterminatedCommandGroup { name: String },
    UnterminatedBraceGroup,
    UnterminatedInlineMath,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnterminatedCommandGroup { name } => write!(
                f,
                "`{}` at {}..{} is closed implicitly at end of input",
                name, self.span.start, self.span.end
            ),
            DiagnosticKind::UnterminatedBraceGroup => write!(
                f,
                "brace group at {}..{} is closed implicitly at end of input",
                self.span.start, self.span.end
            ),
            DiagnosticKind::UnterminatedInlineMath => write!(
                f,
                "inline math at {}..{} is closed implicitly at end of input",
                self.span.start, self.span.end
            ),
        }
    }
}
