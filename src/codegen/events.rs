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

//! Emission events.
//!
//! Handlers never write text directly. They produce a flat stream of events
//! that parents may inspect, reorder or rewrite before the renderer turns
//! it into indented lines.

/// One unit of the emission stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A complete output line.
    Line(String),
    /// A line to emit right after the enclosing statement's line.
    LineAfter(String),
    /// An expression fragment, joined by the consumer.
    Expr(String),
    /// Open an indented block with the given label.
    Begin(String),
    /// Close the block with the given label.
    End(String),
    /// A diagnostic comment.
    Debug(String),
    /// A `break` that an enclosing construct may intercept.
    Break(String),
}

impl Event {
    /// Short name of the event kind, as used in trace output.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Line(_) => "line",
            Event::LineAfter(_) => "line+1",
            Event::Expr(_) => "expr",
            Event::Begin(_) => "begin",
            Event::End(_) => "end",
            Event::Debug(_) => "debug",
            Event::Break(_) => "break",
        }
    }

    /// The text payload.
    pub fn text(&self) -> &str {
        match self {
            Event::Line(t)
            | Event::LineAfter(t)
            | Event::Expr(t)
            | Event::Begin(t)
            | Event::End(t)
            | Event::Debug(t)
            | Event::Break(t) => t,
        }
    }

    /// Rewrite the payload of text-carrying events; block labels are kept.
    pub fn map_text(self, f: impl FnOnce(String) -> String) -> Event {
        match self {
            Event::Line(t) => Event::Line(f(t)),
            Event::LineAfter(t) => Event::LineAfter(f(t)),
            Event::Expr(t) => Event::Expr(f(t)),
            Event::Debug(t) => Event::Debug(f(t)),
            Event::Break(t) => Event::Break(f(t)),
            other @ (Event::Begin(_) | Event::End(_)) => other,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.text())
    }
}

/// Move every non-expression event into `out` and return the expression fragments.
pub(crate) fn split_exprs(events: Vec<Event>, out: &mut Vec<Event>) -> Vec<String> {
    let mut exprs = Vec::new();
    for event in events {
        match event {
            Event::Expr(text) => exprs.push(text),
            other => out.push(other),
        }
    }
    exprs
}

/// Quote a string the way Python's `repr` does.
pub(crate) fn py_repr(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Render a list of strings the way Python's `repr` does.
pub(crate) fn py_repr_list<S: AsRef<str>>(items: &[S]) -> String {
    let inner: Vec<String> = items.iter().map(|s| py_repr(s.as_ref())).collect();
    format!("[{}]", inner.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exprs() {
        let mut out = Vec::new();
        let exprs = split_exprs(
            vec![
                Event::Expr("a".into()),
                Event::Debug("note".into()),
                Event::Expr("b".into()),
            ],
            &mut out,
        );
        assert_eq!(exprs, vec!["a", "b"]);
        assert_eq!(out, vec![Event::Debug("note".into())]);
    }

    #[test]
    fn test_map_text_keeps_labels() {
        let begin = Event::Begin("block-if".into()).map_text(|t| t.to_uppercase());
        assert_eq!(begin, Event::Begin("block-if".into()));
        let line = Event::Line("pass".into()).map_text(|t| t.to_uppercase());
        assert_eq!(line, Event::Line("PASS".into()));
    }

    #[test]
    fn test_py_repr() {
        assert_eq!(py_repr("abc"), "'abc'");
        assert_eq!(py_repr("it's"), "\"it's\"");
        assert_eq!(py_repr_list(&["x", "lista"]), "['x', 'lista']");
        assert_eq!(py_repr_list::<&str>(&[]), "[]");
    }
}
