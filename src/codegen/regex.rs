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

//! Regex literal code generation.
//!
//! The front end splits a `/.../` literal into one `regexchar` per token;
//! these handlers glue the characters back together.

use super::context::{Cursor, Flags};
use super::events::Event;
use super::CodeGenerator;
use crate::symbols::Scope;

/// Extension trait for regex literal code generation.
pub trait RegexEmitter {
    /// Generate a complete regex literal.
    fn generate_regex(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate the body of a regex literal.
    fn generate_regex_body(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a single regex character.
    fn generate_regex_char(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;
}

/// Spelling of a named regex token.
pub fn regex_token(name: &str) -> Option<&'static str> {
    Some(match name {
        "XOR" => "^",
        "LBRACKET" => "[",
        "RBRACKET" => "]",
        "MINUS" => "-",
        "PLUS" => "+",
        "BACKSLASH" => "\\",
        "COMMA" => ",",
        "PERIOD" => ".",
        "MOD" => "%",
        "RBRACE" => "}",
        "LBRACE" => "{",
        "DOLLAR" => "$",
        "COLON" => ":",
        "CONDITIONAL1" => "?",
        "AT" => "@",
        "OR" => "|",
        "RPAREN" => ")",
        "LPAREN" => "(",
        _ => return None,
    })
}

impl CodeGenerator {
    /// Every fragment of a regex node's events, concatenated.
    pub(crate) fn regex_text(&mut self, at: &Cursor<'_>, scope: &Scope) -> String {
        self.generate(at, scope, Flags::inline())
            .iter()
            .map(Event::text)
            .collect()
    }

    fn regex_children(&mut self, at: &Cursor<'_>, scope: &Scope) -> Vec<Event> {
        let mut out = Vec::new();
        for child in at.children() {
            for event in self.generate(&child, scope, Flags::inline()) {
                out.push(Event::Expr(event.text().to_string()));
            }
        }
        out
    }
}

impl RegexEmitter for CodeGenerator {
    fn generate_regex(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        match at.select("regexbody").into_iter().next() {
            Some(body) if !body.node().children.is_empty() => self.regex_children(&body, scope),
            _ => Vec::new(),
        }
    }

    fn generate_regex_body(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        self.regex_children(at, scope)
    }

    fn generate_regex_char(&mut self, at: &Cursor<'_>, _scope: &Scope, _flags: Flags) -> Vec<Event> {
        let value = at.node().get_or("arg00", "");
        if let Some(token) = regex_token(value) {
            return vec![Event::Expr(token.to_string())];
        }

        // Literal characters arrive as `kind:'c'`.
        match value.split(':').nth(1) {
            Some(literal) => {
                let literal = literal.replace('\'', "");
                if literal.is_empty() {
                    Vec::new()
                } else {
                    vec![Event::Expr(literal)]
                }
            }
            None => {
                tracing::warn!("regexchar: unknown item {}", value);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_named_tokens() {
        assert_eq!(regex_token("BACKSLASH"), Some("\\"));
        assert_eq!(regex_token("CONDITIONAL1"), Some("?"));
        assert_eq!(regex_token("STAR"), None);
    }

    #[test]
    fn test_literal_char() {
        assert_eq!(expr_for(r#"<regexchar arg00="ID:'a'"/>"#), "a");
        assert_eq!(expr_for(r#"<regexchar arg00="PERIOD"/>"#), ".");
    }

    #[test]
    fn test_unknown_char_is_dropped() {
        assert!(events_for(r#"<regexchar arg00="GARBAGE"/>"#).is_empty());
    }

    #[test]
    fn test_regex_constant() {
        let expr = expr_for(
            r#"<Constant><regex><regexbody>
                <regexchar arg00="ID:'a'"/><regexchar arg00="PLUS"/><regexchar arg00="BACKSLASH"/><regexchar arg00="ID:'d'"/>
            </regexbody></regex></Constant>"#,
        );
        assert_eq!(expr, r#"qsa.re.compile(r"/a+\d/i")"#);
    }

    #[test]
    fn test_regex_body_constant() {
        let expr = expr_for(
            r#"<Constant><regexbody><regexchar arg00="XOR"/><regexchar arg00="ID:'x'"/></regexbody></Constant>"#,
        );
        assert_eq!(expr, r#"r"^x""#);
    }

    #[test]
    fn test_empty_regex() {
        assert!(events_for("<regex><regexbody/></regex>").is_empty());
    }
}
