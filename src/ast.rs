//! AST definitions for parsed ConTeXt documents
//!
//!     The tree is an ordered forest built in a single pass and immutable
//!     afterwards. Every node owns its children exclusively and carries a
//!     mandatory byte span into the original source, so downstream tooling
//!     (highlighting, folding, outline queries) can always map a node back
//!     onto the buffer.
//!
//! Span discipline
//!
//!     Sibling content items tile their parent region: concatenating the
//!     source slices of the items of an area, in order, reconstructs that
//!     area exactly. Text runs absorb whitespace and inert punctuation to
//!     make this hold; composite nodes (commands, groups) cover their
//!     interior whitespace through their own span.
//!
//! ## Modules
//!
//! - `elements` - node type definitions
//! - `range` - byte-offset to line:column conversion for tooling
//! - `diagnostics` - non-fatal diagnostics and the hard parse error

pub mod diagnostics;
pub mod elements;
pub mod range;

pub use diagnostics::{Diagnostic, DiagnosticKind, ParseError};
pub use elements::{ContentItem, Document, Span};
pub use range::{Position, SourceLocation};
