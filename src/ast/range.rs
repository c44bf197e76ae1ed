//! Byte-offset to line:column conversion
//!
//!     AST nodes store byte spans only. Editor tooling usually wants
//!     line:column pairs, so [`SourceLocation`] pre-computes line starts
//!     once and answers conversions with a binary search.
//!
//!     Columns are byte offsets within the line, consistent with the spans
//!     on the nodes; callers that need character or UTF-16 columns convert
//!     at their own boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line:column position in source code, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Fast byte-offset to [`Position`] conversion over one source buffer.
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self { line_starts }
    }

    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);
        Position::new(line, byte_offset - self.line_starts[line])
    }

    /// Convert a node span to its start and end positions.
    pub fn span_to_positions(&self, span: &std::ops::Range<usize>) -> (Position, Position) {
        (
            self.byte_to_position(span.start),
            self.byte_to_position(span.end),
        )
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }
}
