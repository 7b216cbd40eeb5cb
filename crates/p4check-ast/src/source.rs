//! Source span tracking and constraint quoting.

use std::fmt;

/// A span in the constraint source text, tracking byte offsets and
/// line/column relative to the start of the annotation.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Line number within the annotation (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, in characters not bytes).
    pub column: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Create a dummy span for synthesized nodes.
    pub fn dummy() -> Self {
        Self::default()
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            column: if self.line <= other.line {
                self.column
            } else {
                other.column
            },
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An absolute position in a P4 source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// File the constraint annotation appears in.
    pub file: String,
    /// Line of the first character of the annotation body (1-indexed).
    pub line: u32,
    /// Column of the first character of the annotation body (1-indexed).
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The source text of a constraint annotation together with its anchor
/// in the enclosing P4 file. Held by reference for the duration of an
/// evaluation so diagnostics can quote the original text without copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSource {
    /// Verbatim text of the constraint expression.
    pub text: String,
    /// Where `text` begins in the P4 source file.
    pub location: SourceLocation,
}

impl ConstraintSource {
    pub fn new(text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }

    /// Quote the source substring covered by `span`, or `None` if the
    /// span does not fall inside the text (a malformed AST).
    pub fn quote(&self, span: Span) -> Option<&str> {
        self.text.get(span.start..span.end)
    }

    /// Resolve a span to an absolute file position. Spans on the first
    /// annotation line are offset by the annotation's start column.
    pub fn locate(&self, span: Span) -> SourceLocation {
        let line = self.location.line + span.line.saturating_sub(1);
        let column = if span.line <= 1 {
            self.location.column + span.column.saturating_sub(1)
        } else {
            span.column
        };
        SourceLocation::new(self.location.file.clone(), line, column)
    }
}
