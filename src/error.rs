// qsapy - A transpiler turning QS script syntax trees into Python source
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Error types for the qsapy transpiler.
//!
//! Only source-level problems are errors: unreadable input, malformed XML
//! and unwritable destinations. Problems found while emitting Python are
//! never raised; they turn into diagnostic comments in the output.

use std::ops::Range;
use std::path::Path;
use thiserror::Error;

/// A source span representing a range in the XML input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Get the length of this span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// Error codes for the transpiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexical errors (E001-E020)
    InvalidCharacter,
    UnterminatedComment,
    UnterminatedProcessingInstruction,
    UnterminatedCdata,
    UnterminatedAttributeValue,
    UnterminatedTag,
    InvalidEntity,
    InvalidName,

    // Syntax errors (E100-E120)
    UnexpectedToken,
    UnexpectedEndOfFile,
    ExpectedElement,
    ExpectedAttributeValue,
    MismatchedClosingTag,
    UnclosedElement,
    DuplicateAttribute,
    MultipleRootElements,

    // I/O errors (E300-E310)
    CannotReadInput,
    CannotWriteOutput,
    InvalidEncoding,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            // Lexical errors
            ErrorCode::InvalidCharacter => "E001",
            ErrorCode::UnterminatedComment => "E002",
            ErrorCode::UnterminatedProcessingInstruction => "E003",
            ErrorCode::UnterminatedCdata => "E004",
            ErrorCode::UnterminatedAttributeValue => "E010",
            ErrorCode::UnterminatedTag => "E011",
            ErrorCode::InvalidEntity => "E012",
            ErrorCode::InvalidName => "E013",

            // Syntax errors
            ErrorCode::UnexpectedToken => "E100",
            ErrorCode::UnexpectedEndOfFile => "E101",
            ErrorCode::ExpectedElement => "E102",
            ErrorCode::ExpectedAttributeValue => "E103",
            ErrorCode::MismatchedClosingTag => "E110",
            ErrorCode::UnclosedElement => "E111",
            ErrorCode::DuplicateAttribute => "E112",
            ErrorCode::MultipleRootElements => "E113",

            // I/O errors
            ErrorCode::CannotReadInput => "E300",
            ErrorCode::CannotWriteOutput => "E301",
            ErrorCode::InvalidEncoding => "E302",
        }
    }

    /// Whether the error points into the XML text (and can show context).
    pub fn has_source_context(&self) -> bool {
        !matches!(
            self,
            ErrorCode::CannotReadInput | ErrorCode::CannotWriteOutput | ErrorCode::InvalidEncoding
        )
    }
}

/// A transpiler error with source location.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct TranspileError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// The source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl TranspileError {
    /// Create a new transpile error.
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to this error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Get the error code string.
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Input file could not be read.
    pub fn read(path: &Path, err: std::io::Error) -> Self {
        let code = if err.kind() == std::io::ErrorKind::InvalidData {
            ErrorCode::InvalidEncoding
        } else {
            ErrorCode::CannotReadInput
        };
        Self::new(
            code,
            format!("Cannot read {}: {}", path.display(), err),
            Span::new(0, 0),
        )
    }

    /// Destination file could not be written.
    pub fn write(path: &Path, err: std::io::Error) -> Self {
        Self::new(
            ErrorCode::CannotWriteOutput,
            format!("Cannot write {}: {}", path.display(), err),
            Span::new(0, 0),
        )
    }
}

/// Result type for transpiler operations.
pub type Result<T> = std::result::Result<T, TranspileError>;

/// Source location with line and column information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// The content of the line.
    pub line_content: String,
}

impl SourceLocation {
    /// Calculate line and column from a byte offset in source code.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];

        let line = before.chars().filter(|&c| c == '\n').count() + 1;

        let last_newline = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[last_newline..].chars().count() + 1;

        let line_end = source[offset..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(source.len());
        let line_content = source[last_newline..line_end].to_string();

        Self {
            line,
            column,
            line_content,
        }
    }
}

/// Format an error with source context.
pub fn format_error(error: &TranspileError, source: &str, filename: Option<&str>) -> String {
    let filename = filename.unwrap_or("<input>");

    let mut output = String::new();
    output.push_str(&format!("error[{}]: {}\n", error.code_str(), error.message));

    if !error.code.has_source_context() {
        output.push_str(&format!("  --> {}\n", filename));
        if let Some(hint) = &error.hint {
            output.push_str(&format!("  = hint: {}\n", hint));
        }
        return output;
    }

    let loc = SourceLocation::from_offset(source, error.span.start);
    output.push_str(&format!("  --> {}:{}:{}\n", filename, loc.line, loc.column));

    let line_num_width = loc.line.to_string().len();
    output.push_str(&format!("{:>width$} |\n", "", width = line_num_width));
    output.push_str(&format!(
        "{:>width$} | {}\n",
        loc.line,
        loc.line_content,
        width = line_num_width
    ));

    let underline_start = loc.column - 1;
    let underline_len = error
        .span
        .len()
        .max(1)
        .min(loc.line_content.len().saturating_sub(underline_start).max(1));
    output.push_str(&format!(
        "{:>width$} | {:>start$}{}\n",
        "",
        "",
        "^".repeat(underline_len),
        width = line_num_width,
        start = underline_start
    ));

    if let Some(hint) = &error.hint {
        output.push_str(&format!(
            "{:>width$} = hint: {}\n",
            "",
            hint,
            width = line_num_width
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_creation() {
        let span = Span::new(10, 20);
        assert_eq!(span.start, 10);
        assert_eq!(span.end, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_merge() {
        let merged = Span::new(5, 10).merge(&Span::new(15, 20));
        assert_eq!(merged, Span::new(5, 20));
    }

    #[test]
    fn test_error_code() {
        assert_eq!(ErrorCode::InvalidCharacter.code(), "E001");
        assert_eq!(ErrorCode::UnexpectedToken.code(), "E100");
        assert_eq!(ErrorCode::CannotReadInput.code(), "E300");
    }

    #[test]
    fn test_source_location() {
        let loc = SourceLocation::from_offset("<a>\n  <b/>\n</a>", 6);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.line_content, "  <b/>");
    }

    #[test]
    fn test_format_error_with_context() {
        let source = "<Source>\n<If></While>\n</Source>";
        let error = TranspileError::new(
            ErrorCode::MismatchedClosingTag,
            "Closing tag </While> does not match <If>",
            Span::new(13, 21),
        )
        .with_hint("Close <If> first");
        let text = format_error(&error, source, Some("test.xml"));
        assert!(text.starts_with("error[E110]"));
        assert!(text.contains("--> test.xml:2:5"));
        assert!(text.contains("^^^^^^^^"));
        assert!(text.contains("hint: Close <If> first"));
    }

    #[test]
    fn test_format_io_error_without_context() {
        let error = TranspileError::read(
            Path::new("missing.xml"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        let text = format_error(&error, "", Some("missing.xml"));
        assert!(text.starts_with("error[E300]"));
        assert!(!text.contains(" | "));
    }
}
