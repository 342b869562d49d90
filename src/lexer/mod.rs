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

//! Lexer module for the XML syntax tree input.
//!
//! The upstream QS parser serialises its tree as plain XML. This module
//! tokenizes that document. It handles:
//! - Opening, closing and empty-element tags
//! - Single and double quoted attribute values
//! - Predefined and numeric character references
//! - Comments, processing instructions and DOCTYPE (skipped)
//! - CDATA sections (returned as text)

mod tokens;

pub use tokens::Token;

use crate::error::{ErrorCode, Span, TranspileError};

/// The lexer state for tokenizing XML input.
pub struct Lexer<'source> {
    /// The source document being tokenized.
    source: &'source str,
    /// Current byte position in the source.
    position: usize,
    /// Whether we're between `<name` and its closing `>` or `/>`.
    in_tag: bool,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given document.
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            position: 0,
            in_tag: false,
        }
    }

    /// Get the current position in the source.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check if we've reached the end of the source.
    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Peek at the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    /// Check whether the remaining input starts with `prefix`.
    fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.position..].starts_with(prefix)
    }

    /// Advance to the next character and return it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Create a span from start position to current position.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.position)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Skip past `terminator`, failing with `code` if it never shows up.
    fn skip_past(&mut self, start: usize, terminator: &str, code: ErrorCode) -> Result<(), TranspileError> {
        match self.source[self.position..].find(terminator) {
            Some(offset) => {
                self.position += offset + terminator.len();
                Ok(())
            }
            None => {
                self.position = self.source.len();
                Err(TranspileError::new(
                    code,
                    format!("Missing '{}'", terminator),
                    self.span_from(start),
                ))
            }
        }
    }

    /// Get the next token from the source.
    pub fn next_token(&mut self) -> Result<Option<(Token, Span)>, TranspileError> {
        if self.in_tag {
            return self.next_tag_token().map(Some);
        }

        loop {
            if self.is_at_end() {
                return Ok(None);
            }
            let start = self.position;

            if self.starts_with("<!--") {
                self.skip_past(start, "-->", ErrorCode::UnterminatedComment)?;
                continue;
            }
            if self.starts_with("<?") {
                self.skip_past(start, "?>", ErrorCode::UnterminatedProcessingInstruction)?;
                continue;
            }
            if self.starts_with("<![CDATA[") {
                self.position += "<![CDATA[".len();
                let body_start = self.position;
                self.skip_past(start, "]]>", ErrorCode::UnterminatedCdata)?;
                let text = self.source[body_start..self.position - 3].to_string();
                return Ok(Some((Token::Text(text), self.span_from(start))));
            }
            if self.starts_with("<!") {
                self.skip_declaration(start)?;
                continue;
            }
            if self.starts_with("</") {
                return self.read_closing_tag(start).map(Some);
            }
            if self.starts_with("<") {
                self.advance();
                let name = self.read_name()?;
                self.in_tag = true;
                return Ok(Some((Token::TagOpen(name), self.span_from(start))));
            }

            return self.read_text(start).map(Some);
        }
    }

    /// Skip a `<!DOCTYPE ...>` style declaration, including an internal subset.
    fn skip_declaration(&mut self, start: usize) -> Result<(), TranspileError> {
        let mut depth = 0usize;
        while let Some(c) = self.advance() {
            match c {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(TranspileError::new(
            ErrorCode::UnterminatedTag,
            "Unterminated declaration",
            self.span_from(start),
        ))
    }

    fn read_closing_tag(&mut self, start: usize) -> Result<(Token, Span), TranspileError> {
        self.position += 2;
        let name = self.read_name()?;
        self.skip_whitespace();
        match self.advance() {
            Some('>') => Ok((Token::TagClose(name), self.span_from(start))),
            Some(c) => Err(TranspileError::new(
                ErrorCode::InvalidCharacter,
                format!("Unexpected character '{}' in closing tag", c),
                self.span_from(start),
            )),
            None => Err(TranspileError::new(
                ErrorCode::UnterminatedTag,
                format!("Unterminated closing tag '</{}'", name),
                self.span_from(start),
            )),
        }
    }

    fn next_tag_token(&mut self) -> Result<(Token, Span), TranspileError> {
        self.skip_whitespace();
        let start = self.position;

        let Some(c) = self.peek() else {
            return Err(TranspileError::new(
                ErrorCode::UnterminatedTag,
                "Unterminated tag at end of input",
                self.span_from(start),
            ));
        };

        let token = match c {
            '>' => {
                self.advance();
                self.in_tag = false;
                Token::TagEnd
            }
            '/' if self.starts_with("/>") => {
                self.position += 2;
                self.in_tag = false;
                Token::EmptyTagEnd
            }
            '=' => {
                self.advance();
                Token::Equals
            }
            '"' | '\'' => {
                self.advance();
                Token::AttributeValue(self.read_attribute_value(start, c)?)
            }
            c if is_name_start(c) => Token::AttributeName(self.read_name()?),
            c => {
                self.advance();
                return Err(TranspileError::new(
                    ErrorCode::InvalidCharacter,
                    format!("Unexpected character '{}' inside tag", c),
                    self.span_from(start),
                ));
            }
        };

        Ok((token, self.span_from(start)))
    }

    /// Read an XML name (element or attribute).
    fn read_name(&mut self) -> Result<String, TranspileError> {
        let start = self.position;
        match self.peek() {
            Some(c) if is_name_start(c) => {
                self.advance();
            }
            _ => {
                return Err(TranspileError::new(
                    ErrorCode::InvalidName,
                    "Expected an element or attribute name",
                    Span::new(start, start + 1),
                ));
            }
        }
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.advance();
        }
        Ok(self.source[start..self.position].to_string())
    }

    fn read_attribute_value(&mut self, start: usize, quote: char) -> Result<String, TranspileError> {
        let body_start = self.position;
        loop {
            match self.advance() {
                Some(c) if c == quote => break,
                Some(_) => {}
                None => {
                    return Err(TranspileError::new(
                        ErrorCode::UnterminatedAttributeValue,
                        "Unterminated attribute value",
                        self.span_from(start),
                    ));
                }
            }
        }
        let raw = &self.source[body_start..self.position - quote.len_utf8()];
        decode_entities(raw, body_start, true)
    }

    fn read_text(&mut self, start: usize) -> Result<(Token, Span), TranspileError> {
        while let Some(c) = self.peek() {
            if c == '<' {
                break;
            }
            self.advance();
        }
        let text = decode_entities(&self.source[start..self.position], start, false)?;
        Ok((Token::Text(text), self.span_from(start)))
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

/// Decode predefined and numeric character references.
///
/// Inside attribute values literal whitespace characters are normalised to
/// spaces, as XML requires; character references are kept verbatim.
pub fn decode_entities(raw: &str, offset: usize, attribute: bool) -> Result<String, TranspileError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut consumed = 0usize;

    while let Some(c) = rest.chars().next() {
        if c == '&' {
            let Some(end) = rest.find(';') else {
                return Err(TranspileError::new(
                    ErrorCode::InvalidEntity,
                    "Unterminated character reference",
                    Span::new(offset + consumed, offset + raw.len()),
                ));
            };
            let entity = &rest[1..end];
            let span = Span::new(offset + consumed, offset + consumed + end + 1);
            out.push(resolve_entity(entity).ok_or_else(|| {
                TranspileError::new(
                    ErrorCode::InvalidEntity,
                    format!("Unknown character reference '&{};'", entity),
                    span,
                )
            })?);
            rest = &rest[end + 1..];
            consumed += end + 1;
            continue;
        }

        if attribute && matches!(c, '\t' | '\n' | '\r') {
            out.push(' ');
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
        consumed += c.len_utf8();
    }

    Ok(out)
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Tokenize an XML document into a vector of tokens with spans.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, TranspileError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    while let Some(token_span) = lexer.next_token()? {
        tokens.push(token_span);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_value_and_empty_tag_end() {
        let tokens = tokenize("<Identifier name=\"x\"/>").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::TagOpen("Identifier".to_string()),
                Token::AttributeName("name".to_string()),
                Token::Equals,
                Token::AttributeValue("x".to_string()),
                Token::EmptyTagEnd,
            ]
        );
    }

    #[test]
    fn test_nested_elements() {
        let tokens = tokenize("<Source><If></If></Source>").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::TagOpen("Source".to_string()),
                Token::TagEnd,
                Token::TagOpen("If".to_string()),
                Token::TagEnd,
                Token::TagClose("If".to_string()),
                Token::TagClose("Source".to_string()),
            ]
        );
    }

    #[test]
    fn test_entities_in_attribute() {
        let tokens = tokenize("<Constant delim='&quot;' value=\"a &lt; b &amp;&#65;&#x42;\"/>").unwrap();
        assert_eq!(tokens[3].0, Token::AttributeValue("\"".to_string()));
        assert_eq!(tokens[6].0, Token::AttributeValue("a < b &AB".to_string()));
    }

    #[test]
    fn test_attribute_whitespace_is_normalised() {
        let tokens = tokenize("<a v=\"x\ny\"/>").unwrap();
        assert_eq!(tokens[3].0, Token::AttributeValue("x y".to_string()));
    }

    #[test]
    fn test_prolog_and_comments_are_skipped() {
        let source = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- generated -->\n<Source/>";
        let tokens = tokenize(source).unwrap();
        let real: Vec<_> = tokens.iter().filter(|(t, _)| !t.is_blank_text()).collect();
        assert_eq!(real.len(), 2);
        assert_eq!(real[0].0, Token::TagOpen("Source".to_string()));
    }

    #[test]
    fn test_cdata_is_text() {
        let tokens = tokenize("<a><![CDATA[x < y]]></a>").unwrap();
        assert_eq!(tokens[2].0, Token::Text("x < y".to_string()));
    }

    #[test]
    fn test_unterminated_attribute_value() {
        let err = tokenize("<a v=\"abc").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedAttributeValue);
    }

    #[test]
    fn test_unterminated_tag() {
        let err = tokenize("<a v=\"abc\"").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedTag);
    }

    #[test]
    fn test_unknown_entity() {
        let err = tokenize("<a v=\"&nbsp;\"/>").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidEntity);
        assert_eq!(err.span.start, 6);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("<!-- never closed").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnterminatedComment);
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("<a  b='1'/>").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 2));
        assert_eq!(tokens[1].1, Span::new(4, 5));
        assert_eq!(tokens[3].1, Span::new(6, 9));
        assert_eq!(tokens[4].1, Span::new(9, 11));
    }
}
