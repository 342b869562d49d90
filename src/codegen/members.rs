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

//! Member chain code generation.
//!
//! A `Member` node is a dotted chain (`a.b.c(x)`). Each element is generated
//! on its own, then the chain goes through three rewrites:
//!
//! 1. `other.iface` becomes a cross-module reference.
//! 2. `this.iface.__fn()` and `_i.__fn()` become calls on the parent class.
//! 3. An ordered table turns QS string and array methods into Python
//!    (`s.mid(1, 2)` to `s[1:1 + 2]`, `a.push(x)` to `a.append(x)`, ...).
//!
//! The table works on the generated text of each element, so a call's
//! arguments are parsed back out of `name(...)`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::context::{Cursor, Flags};
use super::events::Event;
use super::{CodeGenerator, UNKNOWN_ARG};
use crate::ast::Node;
use crate::symbols::{Scope, UNDEFINED_PREFIX};

/// Extension trait for member chain code generation.
pub trait MemberEmitter {
    /// Generate a member chain.
    fn generate_member(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;
}

/// Where a rewrite rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    /// The element text equals the rule name (`toString()`).
    Exact,
    /// Property access or call (`length`, `length()`).
    Any,
    /// Only a call (`mid(...)`).
    Call,
}

/// The rewrite table, applied in this order.
const RULES: &[(&str, Form)] = &[
    ("toString()", Form::Exact),
    ("length", Form::Any),
    ("join", Form::Call),
    ("push", Form::Call),
    ("isEmpty()", Form::Exact),
    ("left", Form::Call),
    ("right", Form::Call),
    ("mid", Form::Call),
    ("charAt", Form::Call),
    ("charCodeAt", Form::Call),
    ("arg", Form::Call),
    ("substring", Form::Call),
    ("attributeValue", Form::Call),
    ("match", Form::Call),
    ("replace", Form::Call),
    ("search", Form::Call),
    ("shift()", Form::Exact),
    ("sort", Form::Call),
    ("splice", Form::Call),
];

/// Heads of the chain that name a static runtime class.
const STATIC_CLASSES: &[(&str, &str)] = &[
    ("qsa.File", "qsa.FileStatic"),
    ("qsa.Dir", "qsa.DirStatic"),
    ("qsa.Process", "qsa.ProcessStatic"),
];

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"%\d").expect("valid placeholder pattern"));

/// The argument text of `name(args)`, if `element` is a call of `name`.
fn call_value<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    element
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Split call arguments on top-level commas.
///
/// Commas inside brackets or string literals do not split.
pub fn split_arguments(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Rewrite one matched element. `None` leaves the chain untouched.
fn apply_rule(name: &str, element: &str, head: &str, tail: &[String]) -> Option<Vec<String>> {
    let value = call_value(element, name).unwrap_or("");
    let args = split_arguments(value);
    let rewritten = match name {
        "toString()" => format!("qsa.parseString({})", head),
        "length" => format!("qsa.length({})", head),
        "join" => {
            let separator = if value.is_empty() { "\"\"" } else { value };
            format!("{}.join({})", separator, head)
        }
        "push" => match args.len() {
            0 => return None,
            1 => format!("{}.append({})", head, args[0]),
            _ => format!("{}.extend([{}])", head, args.join(", ")),
        },
        "isEmpty()" => format!("{} == ''", head),
        "left" => format!("{}[0:{}]", head, value),
        "right" => format!("{}[(len({}) - ({})):]", head, head, value),
        "mid" => match args.as_slice() {
            [start] => format!("{}[{}:]", head, start),
            [start, length] => format!("{}[{}:{} + {}]", head, start, start, length),
            _ => return None,
        },
        "charAt" => format!("{}[{}]", head, value),
        "charCodeAt" => format!("ord({}[{}])", head, value),
        "arg" => return Some(format_arguments(head, value, tail)),
        "substring" => match args.as_slice() {
            [start] => format!("{}[{}:]", head, start),
            [start, end] => format!("{}[{}:{}]", head, start, end),
            _ => return None,
        },
        "attributeValue" => format!("{}.attributes().namedItem({}).nodeValue()", head, value),
        "match" => format!("qsa.re.match({}, {})", value, head),
        "replace" => {
            let pattern = args.first()?;
            if pattern.contains("re.compile") {
                format!("{}.sub({}, {})", pattern, args[1..].join(", "), head)
            } else if tail.first().is_some_and(|t| t.starts_with("replace")) || args.len() > 2 {
                return None;
            } else {
                format!("qsa.replace({}, {})", head, value)
            }
        }
        "search" => format!("{}.find({})", head, value),
        "shift()" => format!("{}.pop(0)", head),
        "sort" => format!("qsa.Sort({}).sort_({})", value, head),
        "splice" => format!("qsa.splice({}, {})", head, value),
        _ => return None,
    };

    let mut result = vec![rewritten];
    result.extend_from_slice(tail);
    Some(result)
}

/// `"%1 of %2".arg(a).arg(b)` to `"%s of %s" % (str(a), str(b))`.
///
/// Later `arg()` calls of the same chain are folded into the first one.
fn format_arguments(head: &str, value: &str, tail: &[String]) -> Vec<String> {
    let converted = format!("str({})", value);
    if head.contains(&converted) {
        return vec![head.to_string()];
    }
    let rest: String = tail
        .iter()
        .map(|t| format!(", {}", t.replace("arg(", "str(")))
        .collect();
    let head = PLACEHOLDER.replace_all(head, "%s");
    vec![format!("{} % ({}{})", head, converted, rest)]
}

/// Run the rewrite table over a chain.
pub fn rewrite_chain(mut arguments: Vec<String>) -> Vec<String> {
    for (name, form) in RULES {
        let mut index = 0;
        while index < arguments.len() {
            let element = arguments[index].clone();
            let matches = match form {
                Form::Exact => element == *name,
                Form::Any => element == *name || call_value(&element, name).is_some(),
                Form::Call => call_value(&element, name).is_some(),
            };
            // A bare variable that shares a method name is left alone.
            if !matches || index == 0 {
                index += 1;
                continue;
            }

            let head = arguments[..index].join(".");
            let tail = arguments[index + 1..].to_vec();
            match apply_rule(name, &element, &head, &tail) {
                // The rewritten head is now the first element.
                Some(rewritten) => {
                    arguments = rewritten;
                    index = 1;
                }
                None => index += 1,
            }
        }
    }
    arguments
}

/// The enclosing function's name and the class part of it, for `__fn` calls.
fn parent_class_name(at: &Cursor<'_>, element: &str) -> Option<String> {
    let function: &Node = at.ancestors().find(|a| a.is("Function"))?;
    let full = function.get_or("name", "unnamed_function");
    let called = element.trim_start_matches("__");
    let called = called.split('(').next().unwrap_or(called);
    let suffix = format!("_{}", called);
    Some(if full.starts_with(&suffix) {
        full.split('_').next().unwrap_or_default().to_string()
    } else {
        full.replace(&suffix, "")
    })
}

impl MemberEmitter for CodeGenerator {
    fn generate_member(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let mut arguments = Vec::new();
        for (n, element) in at.children().enumerate() {
            arguments.push(self.joined_argument(
                &element,
                scope,
                Flags::member(n > 0),
                n,
                "Argument",
                UNKNOWN_ARG,
                &mut out,
            ));
        }
        if arguments.is_empty() {
            out.push(Event::Debug("Member without elements".to_string()));
            out.push(Event::Expr(UNKNOWN_ARG.to_string()));
            return out;
        }

        // other.iface refers to another module's interface.
        if arguments.len() >= 2
            && arguments[1] == "iface"
            && arguments[0] != "self"
            && !arguments[0].starts_with("qsa.from_project")
        {
            arguments[0] = format!(
                "qsa.from_project(\"{}\")",
                arguments[0].replace(UNDEFINED_PREFIX, "")
            );
        }

        // this.iface.__fn() calls the inherited implementation.
        if arguments.len() >= 3
            && arguments[0] == "self"
            && arguments[1] == "iface"
            && arguments[2].starts_with("__")
        {
            if let Some(class) = parent_class_name(at, &arguments[2]) {
                arguments[2] = arguments[2][2..].to_string();
                let receiver = format!("super(getattr(self._module, \"{}\"), self.iface)", class);
                arguments.drain(..2);
                arguments.insert(0, receiver);
            }
        }

        // Same for the `_i` interface alias.
        if arguments.len() >= 2 && arguments[0] == "_i" && arguments[1].starts_with("__") {
            if let Some(class) = parent_class_name(at, &arguments[1]) {
                arguments[1] = arguments[1][2..].to_string();
                arguments[0] = format!("super(getattr(self._module, \"{}\"), _i)", class);
            }
        }

        if let Some((_, replacement)) = STATIC_CLASSES.iter().find(|(from, _)| arguments[0] == *from) {
            arguments[0] = replacement.to_string();
        }

        let arguments = rewrite_chain(arguments);
        out.push(Event::Expr(arguments.join(".")));
        out
    }
}
