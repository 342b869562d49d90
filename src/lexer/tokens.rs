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

//! Token definitions for the XML syntax tree input.

/// A token of the XML markup.
///
/// Comments, processing instructions and the document type declaration are
/// consumed by the lexer and never show up as tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<name` - start of an element's opening tag.
    TagOpen(String),
    /// `</name>` - a complete closing tag.
    TagClose(String),
    /// Attribute name inside an opening tag.
    AttributeName(String),
    /// `=` between attribute name and value.
    Equals,
    /// Quoted attribute value, with entities already decoded.
    AttributeValue(String),
    /// `>` - end of an opening tag.
    TagEnd,
    /// `/>` - end of an empty-element tag.
    EmptyTagEnd,
    /// Character data between tags (entities decoded, CDATA unwrapped).
    Text(String),
}

impl Token {
    /// Whether this token is character data made of whitespace only.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Token::Text(text) if text.trim().is_empty())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::TagOpen(name) => write!(f, "'<{}'", name),
            Token::TagClose(name) => write!(f, "'</{}>'", name),
            Token::AttributeName(name) => write!(f, "attribute '{}'", name),
            Token::Equals => write!(f, "'='"),
            Token::AttributeValue(value) => write!(f, "value \"{}\"", value),
            Token::TagEnd => write!(f, "'>'"),
            Token::EmptyTagEnd => write!(f, "'/>'"),
            Token::Text(_) => write!(f, "character data"),
        }
    }
}
