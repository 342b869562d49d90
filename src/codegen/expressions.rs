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

//! Expression code generation.
//!
//! Every handler here answers with `Expr` fragments; the consumer joins
//! them with single spaces. Statements that surface inside an expression
//! (an inline `x++`, an anonymous function body) pass through as their own
//! events and are placed by the enclosing statement.

use super::context::{Cursor, Flags};
use super::events::{py_repr_list, split_exprs, Event};
use super::{not_understood, CodeGenerator, UNKNOWN_ARG};
use crate::symbols::{Scope, UNDEFINED_PREFIX};

/// Extension trait for expression code generation.
pub trait ExpressionEmitter {
    /// Generate a function call.
    fn generate_function_call(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags)
        -> Vec<Event>;

    /// Generate a value wrapper.
    fn generate_value(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate an expression, coercing string concatenation.
    fn generate_expression(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a parenthesized expression.
    fn generate_parentheses(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags)
        -> Vec<Event>;

    /// Generate `cond ? a : b`.
    fn generate_ternary(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate an object literal.
    fn generate_dict_object(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags)
        -> Vec<Event>;

    /// Generate one `key: value` entry of an object literal.
    fn generate_dict_elem(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a unary operation.
    fn generate_unary(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a `new` expression.
    fn generate_new(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a literal.
    fn generate_constant(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate an identifier reference.
    fn generate_identifier(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate `a[b]`.
    fn generate_array_member(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
    ) -> Vec<Event>;

    /// Generate an assignment operator.
    fn generate_op_update(&mut self, at: &Cursor<'_>) -> Vec<Event>;

    /// Generate a comparison or logical operator.
    fn generate_compare(&mut self, at: &Cursor<'_>) -> Vec<Event>;

    /// Generate an arithmetic or bitwise operator.
    fn generate_op_math(&mut self, at: &Cursor<'_>) -> Vec<Event>;
}

/// Python spelling of an assignment operator.
pub fn update_operator(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "EQUALS" => "=",
        "PLUSEQUAL" => "+=",
        "MINUSEQUAL" => "-=",
        "TIMESEQUAL" => "*=",
        "DIVEQUAL" => "/=",
        "MODEQUAL" => "%=",
        _ => return None,
    })
}

/// Python spelling of a comparison or logical operator.
pub fn compare_operator(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "GT" => ">",
        "LT" => "<",
        "LE" => "<=",
        "GE" => ">=",
        "EQ" => "==",
        "NE" => "!=",
        "EQQ" => "is",
        "NEQ" => "is not",
        "IN" => "in",
        "LOR" => "or",
        "LAND" => "and",
        _ => return None,
    })
}

/// Python spelling of an arithmetic operator.
pub fn math_operator(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "PLUS" => "+",
        "MINUS" => "-",
        "TIMES" => "*",
        "DIVIDE" => "/",
        "MOD" => "%",
        "XOR" => "^",
        "OR" => "or",
        "LSHIFT" => "<<",
        "RSHIFT" => ">>",
        "AND" => "&",
        _ => return None,
    })
}

fn operator_event(at: &Cursor<'_>, family: &str, lookup: fn(&str) -> Option<&'static str>) -> Vec<Event> {
    let kind = at.node().get_or("type", "NONE");
    let text = match lookup(kind) {
        Some(op) => op.to_string(),
        None => format!("{}.{}", family, kind),
    };
    vec![Event::Expr(text)]
}

/// Quote an object-literal key unless it already is a string.
fn quote_key(key: String) -> String {
    if key.starts_with('\'') || key.starts_with('"') {
        key
    } else {
        format!("'{}'", key)
    }
}

impl ExpressionEmitter for CodeGenerator {
    fn generate_function_call(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
    ) -> Vec<Event> {
        let node = at.node();
        let mut out = Vec::new();
        let mut name = self.local_var(node.get_or("name", "noname"), scope, flags.is_member);

        // Unnamed calls take the callee from their first child.
        if name.is_empty() {
            let callee = match at.nth_child(0) {
                Some(callee) => {
                    let events = self.generate(&callee, scope, Flags::inline());
                    Some((split_exprs(events, &mut out), callee))
                }
                None => None,
            };
            name = match callee {
                Some((mut expr, _)) if expr.len() == 1 => expr.remove(0),
                Some((expr, _)) if expr.len() > 1 => {
                    out.push(Event::Debug("Multiple function names".to_string()));
                    out.push(Event::Debug(py_repr_list(&expr)));
                    "unknownFn".to_string()
                }
                Some((_, callee)) => {
                    out.push(Event::Debug("Function name not understood".to_string()));
                    out.push(Event::Debug(callee.node().to_xml()));
                    "unknownFn".to_string()
                }
                None => {
                    out.push(Event::Debug("Function name not understood".to_string()));
                    "unknownFn".to_string()
                }
            };
        }

        // A statement calling the parent class is the parent constructor.
        if at.parent().is_some_and(|p| p.is("InstructionCall")) {
            if let Some(class) = at.ancestors().find(|a| a.is("Class")) {
                if class.get("extends") == Some(name.as_str()) {
                    name = format!("super({}, self).__init__", class.get_or("name", ""));
                }
            }
        }

        let mut arguments = Vec::new();
        for (n, arg) in at.select("CallArguments/*").iter().enumerate() {
            let events = self.generate(arg, scope, Flags::inline());
            let expr = split_exprs(events, &mut out);
            if expr.is_empty() {
                arguments.push(UNKNOWN_ARG.to_string());
                not_understood(&mut out, "Argument", n, arg.node());
            } else {
                arguments.push(expr.join(" ").replace("( ", "(").replace(" )", ")"));
            }
        }

        if self.is_strict() {
            if let Some(member) = name.strip_prefix(UNDEFINED_PREFIX) {
                name = format!("self.{}", member);
            }
        }

        out.push(Event::Expr(format!("{}({})", name, arguments.join(", "))));
        out
    }

    fn generate_value(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let isolate = flags.isolate.unwrap_or(true);
        let mut out = Vec::new();
        if isolate {
            out.push(Event::Expr("(".to_string()));
        }
        for child in at.children() {
            out.extend(self.generate(&child, scope, Flags::default()));
        }
        if isolate {
            out.push(Event::Expr(")".to_string()));
        }
        out
    }

    fn generate_expression(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let node = at.node();
        let isolate = flags.isolate.unwrap_or(true);
        // `"a" + 1` concatenates in QS; make the conversion explicit.
        let coerce = node.has_child_with("OpMath", "type", "PLUS")
            && node.has_child_with("Constant", "type", "String");

        let mut out = Vec::new();
        if isolate {
            out.push(Event::Expr("(".to_string()));
        }
        if coerce {
            out.push(Event::Expr("qsa.ustr(".to_string()));
        }
        for child in at.children() {
            if coerce && child.node().is("OpMath") && child.node().get("type") == Some("PLUS") {
                out.push(Event::Expr(",".to_string()));
                continue;
            }
            out.extend(self.generate(&child, scope, Flags::default()));
        }
        if coerce {
            out.push(Event::Expr(")".to_string()));
        }
        if isolate {
            out.push(Event::Expr(")".to_string()));
        }
        out
    }

    fn generate_parentheses(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        _flags: Flags,
    ) -> Vec<Event> {
        let mut out = vec![Event::Expr("(".to_string())];
        for child in at.children() {
            out.extend(self.generate(&child, scope, Flags::inline()));
        }
        out.push(Event::Expr(")".to_string()));
        out
    }

    fn generate_ternary(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let (Some(condition), Some(then_value), Some(else_value)) =
            (at.nth_child(0), at.nth_child(1), at.nth_child(2))
        else {
            return vec![
                Event::Debug("Ternary operator needs a condition and two values".to_string()),
                Event::Debug(at.node().to_xml()),
                Event::Expr("None".to_string()),
            ];
        };

        let mut out = vec![Event::Expr("(".to_string())];
        out.extend(self.generate(&then_value, scope, Flags::default()));
        out.push(Event::Expr("if".to_string()));
        out.extend(self.generate(&condition, scope, Flags::default()));
        out.push(Event::Expr("else".to_string()));
        out.extend(self.generate(&else_value, scope, Flags::default()));
        out.push(Event::Expr(")".to_string()));
        out
    }

    fn generate_dict_object(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        _flags: Flags,
    ) -> Vec<Event> {
        let mut out = vec![Event::Expr("qsa.AttributeDict({".to_string())];
        for child in at.children() {
            let events = self.generate(&child, scope, Flags::default());
            if events.is_empty() {
                continue;
            }
            let mut events = events.into_iter();
            if let Some(key) = events.next() {
                out.push(key.map_text(quote_key));
            }
            out.extend(events);
            out.push(Event::Expr(",".to_string()));
        }
        out.push(Event::Expr("})".to_string()));
        out
    }

    fn generate_dict_elem(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let (Some(key), Some(value)) = (at.nth_child(0), at.nth_child(1)) else {
            return vec![
                Event::Debug("Object entry needs a key and a value".to_string()),
                Event::Debug(at.node().to_xml()),
            ];
        };
        let mut out = self.generate(&key, scope, Flags::member(true));
        out.push(Event::Expr(":".to_string()));
        out.extend(self.generate(&value, scope, Flags::default()));
        out
    }

    fn generate_unary(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let isolate = flags.isolate.unwrap_or(false);
        let operator = match at.node().get_or("type", "NONE") {
            "LNOT" => "not".to_string(),
            "MINUS" => "-".to_string(),
            "PLUS" => "+".to_string(),
            other => other.to_string(),
        };

        let mut out = vec![Event::Expr(operator)];
        if isolate {
            out.push(Event::Expr("(".to_string()));
        }
        for child in at.children() {
            out.extend(self.generate(&child, scope, Flags::default()));
        }
        if isolate {
            out.push(Event::Expr(")".to_string()));
        }
        out
    }

    fn generate_new(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        for child in at.children() {
            let bare = child.node().is("Identifier");
            for event in self.generate(&child, scope, Flags::default()) {
                out.push(match event {
                    // `new Foo` without arguments is still a call.
                    Event::Expr(text) if bare => Event::Expr(format!("{}()", text)),
                    other => other,
                });
            }
        }
        out
    }

    fn generate_constant(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let node = at.node();
        if let (Some(ctype), Some(value)) = (node.get("type"), node.get("value")) {
            let text = match ctype {
                "String" if node.get("delim") == Some("'") => format!("'{}'", value),
                "String" => format!("\"{}\"", value),
                "Number" => match value.trim_start_matches('0') {
                    "" => "0".to_string(),
                    digits => digits.to_string(),
                },
                _ => value.to_string(),
            };
            return vec![Event::Expr(text)];
        }

        let mut out = Vec::new();
        for child in at.children() {
            match child.node().tag.as_str() {
                // Array literal contents are not carried by the front end.
                "list_constant" => out.push(Event::Expr("[]".to_string())),
                "regex" => {
                    let body = self.regex_text(&child, scope);
                    out.push(Event::Expr(format!("qsa.re.compile(r\"/{}/i\")", body)));
                }
                "regexbody" => {
                    let body = self.regex_text(&child, scope);
                    out.push(Event::Expr(format!("r\"{}\"", body)));
                }
                "CallArguments" => {
                    let mut arguments = Vec::new();
                    for (n, arg) in child.children().enumerate() {
                        arguments.push(self.joined_argument(
                            &arg,
                            scope,
                            Flags::inline(),
                            n,
                            "Argument",
                            UNKNOWN_ARG,
                            &mut out,
                        ));
                    }
                    out.push(Event::Expr(format!("qsa.Array([{}])", arguments.join(", "))));
                }
                _ => out.extend(self.generate(&child, scope, Flags::inline())),
            }
        }
        out
    }

    fn generate_identifier(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let name = at.node().get_or("name", "unnamed_var");
        vec![Event::Expr(self.local_var(name, scope, flags.is_member))]
    }

    fn generate_array_member(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        _flags: Flags,
    ) -> Vec<Event> {
        let mut out = Vec::new();
        let mut arguments = Vec::new();
        for (n, arg) in at.children().enumerate() {
            let flags = Flags {
                isolate: Some(false),
                is_member: n == 0,
                ..Flags::default()
            };
            arguments.push(self.joined_argument(&arg, scope, flags, n, "Argument", UNKNOWN_ARG, &mut out));
        }
        arguments.resize(2, UNKNOWN_ARG.to_string());
        out.push(Event::Expr(format!("{}[{}]", arguments[0], arguments[1])));
        out
    }

    fn generate_op_update(&mut self, at: &Cursor<'_>) -> Vec<Event> {
        operator_event(at, "OpUpdate", update_operator)
    }

    fn generate_compare(&mut self, at: &Cursor<'_>) -> Vec<Event> {
        operator_event(at, "Compare", compare_operator)
    }

    fn generate_op_math(&mut self, at: &Cursor<'_>) -> Vec<Event> {
        operator_event(at, "Math", math_operator)
    }
}
