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

//! Parser helper methods for token stream navigation and error handling.
//!
//! This module provides utility methods for the parser including:
//! - Token stream navigation (peek, advance, check)
//! - Token expectation
//! - Error creation

use super::Parser;
use crate::error::{ErrorCode, Span, TranspileError};
use crate::lexer::Token;

/// Trait for parser helper operations.
pub trait ParserHelpers<'a> {
    /// Check if we've reached the end of the token stream.
    fn is_at_end(&self) -> bool;

    /// Peek at the current token without advancing.
    fn peek(&self) -> Option<&Token>;

    /// Peek at the current token's span.
    fn peek_span(&self) -> Option<Span>;

    /// Get the previous token's span (for error reporting).
    fn previous_span(&self) -> Span;

    /// Advance to the next token and return the current one.
    fn advance(&mut self) -> Option<(Token, Span)>;

    /// Check if the current token is of the expected kind.
    fn check(&self, expected: &Token) -> bool;

    /// Expect the current token to be of the given kind, or return an error.
    fn expect(&mut self, expected: &Token, message: &str) -> Result<(Token, Span), TranspileError>;

    /// Skip whitespace-only character data.
    fn skip_blank_text(&mut self);

    /// Create an error at the current position.
    fn error(&self, code: ErrorCode, message: impl Into<String>) -> TranspileError;
}

impl<'a> ParserHelpers<'a> for Parser<'a> {
    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Option<Span> {
        self.tokens.get(self.position).map(|(_, s)| s.clone())
    }

    fn previous_span(&self) -> Span {
        if self.position > 0 {
            self.tokens[self.position - 1].1.clone()
        } else if let Some((_, span)) = self.tokens.first() {
            span.clone()
        } else {
            Span::new(0, 0)
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let result = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        Some(result)
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    fn expect(&mut self, expected: &Token, message: &str) -> Result<(Token, Span), TranspileError> {
        if self.check(expected) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        let found = self
            .peek()
            .map_or("end of file".to_string(), |t| t.to_string());
        let code = if self.is_at_end() {
            ErrorCode::UnexpectedEndOfFile
        } else {
            ErrorCode::UnexpectedToken
        };
        Err(self.error(code, format!("{}, found {}", message, found)))
    }

    fn skip_blank_text(&mut self) {
        while self.peek().is_some_and(Token::is_blank_text) {
            self.advance();
        }
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>) -> TranspileError {
        let span = self.peek_span().unwrap_or_else(|| self.previous_span());
        TranspileError::new(code, message, span)
    }
}
