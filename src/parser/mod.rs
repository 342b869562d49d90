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

//! Parser module for the XML syntax tree input.
//!
//! This module turns the token stream into a [`Node`] tree. It is a small
//! recursive descent over elements; character data between elements carries
//! no meaning in the QS tree and is dropped.
//!
//! # Module Structure
//!
//! - `helpers` - Token stream navigation and error handling (ParserHelpers trait)

pub mod helpers;

use helpers::ParserHelpers;

use crate::ast::Node;
use crate::error::{ErrorCode, Span, TranspileError};
use crate::lexer::{tokenize, Token};

/// The parser state.
pub struct Parser<'a> {
    /// The token stream to parse.
    pub(crate) tokens: &'a [(Token, Span)],
    /// Current position in the token stream.
    pub(crate) position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given token stream.
    pub fn new(tokens: &'a [(Token, Span)]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the complete document and return its root element.
    pub fn parse(&mut self) -> Result<Node, TranspileError> {
        self.skip_blank_text();

        if self.is_at_end() {
            return Err(self.error(ErrorCode::ExpectedElement, "Document has no root element"));
        }
        let root = self.parse_element()?;

        self.skip_blank_text();
        if let Some(token) = self.peek() {
            let code = if matches!(token, Token::TagOpen(_)) {
                ErrorCode::MultipleRootElements
            } else {
                ErrorCode::UnexpectedToken
            };
            let message = format!("Unexpected {} after the root element", token);
            return Err(self
                .error(code, message)
                .with_hint(format!("The document must contain a single <{}> root", root.tag)));
        }

        Ok(root)
    }

    /// Parse one element including its subtree.
    fn parse_element(&mut self) -> Result<Node, TranspileError> {
        let (token, open_span) = self.expect(&Token::TagOpen(String::new()), "Expected an element")?;
        let Token::TagOpen(tag) = token else {
            return Err(TranspileError::new(
                ErrorCode::ExpectedElement,
                "Expected an element",
                open_span,
            ));
        };
        let mut node = Node::new(tag);

        loop {
            match self.advance() {
                Some((Token::AttributeName(key), span)) => {
                    self.expect(&Token::Equals, &format!("Expected '=' after attribute '{}'", key))?;
                    let value = match self.advance() {
                        Some((Token::AttributeValue(value), _)) => value,
                        _ => {
                            return Err(TranspileError::new(
                                ErrorCode::ExpectedAttributeValue,
                                format!("Expected a quoted value for attribute '{}'", key),
                                span,
                            ));
                        }
                    };
                    if node.get(&key).is_some() {
                        return Err(TranspileError::new(
                            ErrorCode::DuplicateAttribute,
                            format!("Attribute '{}' is repeated on <{}>", key, node.tag),
                            span,
                        ));
                    }
                    node.attrs.push((key, value));
                }
                Some((Token::EmptyTagEnd, _)) => return Ok(node),
                Some((Token::TagEnd, _)) => break,
                Some((other, span)) => {
                    return Err(TranspileError::new(
                        ErrorCode::UnexpectedToken,
                        format!("Unexpected {} inside <{}>", other, node.tag),
                        span,
                    ));
                }
                None => {
                    return Err(self.error(
                        ErrorCode::UnexpectedEndOfFile,
                        format!("Unterminated tag <{}>", node.tag),
                    ));
                }
            }
        }

        self.parse_children(&mut node, open_span)?;
        Ok(node)
    }

    /// Parse the content of an element up to and including its closing tag.
    fn parse_children(&mut self, node: &mut Node, open_span: Span) -> Result<(), TranspileError> {
        loop {
            match self.peek() {
                Some(Token::Text(_)) => {
                    self.advance();
                }
                Some(Token::TagOpen(_)) => {
                    let child = self.parse_element()?;
                    node.children.push(child);
                }
                Some(Token::TagClose(name)) => {
                    if *name != node.tag {
                        let message = format!("Closing tag </{}> does not match <{}>", name, node.tag);
                        return Err(self
                            .error(ErrorCode::MismatchedClosingTag, message)
                            .with_hint(format!("Close <{}> first", node.tag)));
                    }
                    self.advance();
                    return Ok(());
                }
                Some(other) => {
                    let message = format!("Unexpected {} inside <{}>", other, node.tag);
                    return Err(self.error(ErrorCode::UnexpectedToken, message));
                }
                None => {
                    return Err(TranspileError::new(
                        ErrorCode::UnclosedElement,
                        format!("Element <{}> is never closed", node.tag),
                        open_span,
                    ));
                }
            }
        }
    }
}

/// Parse a token stream into a syntax tree.
pub fn parse(tokens: &[(Token, Span)]) -> Result<Node, TranspileError> {
    let mut parser = Parser::new(tokens);
    parser.parse()
}

/// Tokenize and parse an XML document.
pub fn parse_document(source: &str) -> Result<Node, TranspileError> {
    let tokens = tokenize(source)?;
    parse(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_creation() {
        let tokens = vec![];
        let parser = Parser::new(&tokens);
        assert!(parser.is_at_end());
    }

    #[test]
    fn test_parse_single_element() {
        let root = parse_document("<Source/>").unwrap();
        assert_eq!(root.tag, "Source");
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_parse_nested_with_attributes() {
        let source = r#"<?xml version="1.0"?>
<Source>
  <Variable name="x" type="Number">
    <Value><Constant type="Number" value="1"/></Value>
  </Variable>
</Source>"#;
        let root = parse_document(source).unwrap();
        let var = root.child(0).unwrap();
        assert_eq!(var.tag, "Variable");
        assert_eq!(var.get("name"), Some("x"));
        assert_eq!(var.get("type"), Some("Number"));
        let constant = var.find("Value/Constant").unwrap();
        assert_eq!(constant.get("value"), Some("1"));
    }

    #[test]
    fn test_text_content_is_dropped() {
        let root = parse_document("<a>hello<b/>world</a>").unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = parse_document("<Source><If></While></Source>").unwrap_err();
        assert_eq!(err.code, ErrorCode::MismatchedClosingTag);
        assert_eq!(err.span, Span::new(12, 20));
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse_document("<Source><If>").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnclosedElement);
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = parse_document("<a x='1' x='2'/>").unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateAttribute);
    }

    #[test]
    fn test_missing_attribute_value() {
        let err = parse_document("<a x=/>").unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedAttributeValue);
    }

    #[test]
    fn test_multiple_roots() {
        let err = parse_document("<a/><b/>").unwrap_err();
        assert_eq!(err.code, ErrorCode::MultipleRootElements);
    }

    #[test]
    fn test_empty_document() {
        let err = parse_document("  \n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedElement);
    }
}
