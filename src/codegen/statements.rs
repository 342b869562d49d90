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

//! Statement code generation.
//!
//! This module provides code generation for blocks and simple statements:
//! - statement blocks (`Source`)
//! - class and function declarations
//! - variable declarations and declaration blocks
//! - assignments, inline updates and call statements
//! - return, break, continue and throw
//! - delete

use super::context::{Cursor, Flags};
use super::events::{split_exprs, Event};
use super::registry::{handler_for, HandlerKind};
use super::{not_understood, CodeGenerator, UNKNOWN_ARG};
use crate::symbols::Scope;

/// Name of the synthetic class holding the script's module object.
pub const MODULE_CLASS: &str = "FormInternalObj";

/// Extension trait for statement code generation.
pub trait StatementEmitter {
    /// Generate a statement block with the given scope.
    fn generate_source(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a class declaration.
    fn generate_class(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a function declaration (named or anonymous).
    fn generate_function(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a variable declaration.
    fn generate_variable(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate a `var`/`const` declaration list.
    fn generate_declaration_block(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
    ) -> Vec<Event>;

    /// Generate an assignment statement.
    fn generate_instruction_update(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
    ) -> Vec<Event>;

    /// Generate `x++`/`x--`.
    fn generate_inline_update(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags)
        -> Vec<Event>;

    /// Generate an expression statement.
    fn generate_instruction_call(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
    ) -> Vec<Event>;

    /// Generate an instruction the front end could not classify.
    fn generate_instruction(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate return, break, continue and throw.
    fn generate_instruction_flow(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
    ) -> Vec<Event>;

    /// Generate a `delete` statement.
    fn generate_delete(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;
}

impl StatementEmitter for CodeGenerator {
    fn generate_source(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let mut elems = 0usize;
        let mut after_lines: Vec<String> = Vec::new();
        let mut prev_kind: Option<HandlerKind> = None;
        let child_flags = Flags {
            break_mode: flags.break_mode,
            plusplus_as_instruction: true,
            ..Flags::default()
        };

        for child in at.children() {
            let kind = handler_for(&child.node().tag);
            if kind == HandlerKind::Function && prev_kind != Some(kind) {
                out.push(Event::Line(String::new()));
            }
            prev_kind = Some(kind);

            for event in self.generate(&child, scope, child_flags) {
                match event {
                    Event::LineAfter(text) => after_lines.push(text),
                    Event::Line(text) => {
                        elems += 1;
                        out.push(Event::Line(text));
                        elems += after_lines.len();
                        out.extend(after_lines.drain(..).map(Event::Line));
                    }
                    Event::Break(text) => {
                        out.push(Event::Break(text));
                        elems += after_lines.len();
                        out.extend(after_lines.drain(..).map(Event::Line));
                    }
                    other => out.push(other),
                }
            }
        }

        elems += after_lines.len();
        out.extend(after_lines.into_iter().map(Event::Line));
        if elems == 0 && flags.include_pass {
            out.push(Event::Line("pass".to_string()));
        }
        out
    }

    fn generate_class(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let node = at.node();
        let name = node.get_or("name", "unnamed");
        let extends = node.get_or("extends", "object");
        scope.declare(name);

        let mut out = vec![
            Event::Line(format!("# /** @class_declaration {} */", name)),
            Event::Line(format!("class {}({}):", name, extends)),
            Event::Begin(format!("block-class-{}", name)),
        ];
        for source in at.select("Source") {
            self.classes_defined.clear();
            out.extend(self.generate(&source, scope, Flags::default()));
        }
        out.push(Event::End(format!("block-class-{}", name)));
        out
    }

    fn generate_function(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let node = at.node();
        let mut out = Vec::new();
        let (mut name, anonymous) = match node.get("name").filter(|n| !n.is_empty()) {
            Some(raw) => (self.other_var(raw), false),
            None => ("_anonymous_fn_".to_string(), true),
        };
        let without_self = node.get("withoutself").is_some_and(|v| !v.is_empty());
        let grandparent = at.grandparent();

        // Methods of the module object are grouped by their name prefix.
        if grandparent.is_some_and(|gp| gp.get("name") == Some(MODULE_CLASS)) {
            let mut group = name.split('_').next().unwrap_or_default().to_string();
            if group.is_empty() {
                group = MODULE_CLASS.to_string();
            }
            if !self.classes_defined.contains(&group) {
                out.push(Event::Line(format!("# /** @class_definition {} */", group)));
                self.classes_defined.push(group);
            }
        }

        let mut arguments: Vec<String> = Vec::new();
        if !without_self {
            match grandparent {
                Some(gp) if gp.is("Class") => {
                    arguments.push("self".to_string());
                    if gp.get("name") == Some(name.as_str()) {
                        name = "__init__".to_string();
                    }
                }
                Some(_) => {}
                None => arguments.push("self".to_string()),
            }
        }

        // Parameters are declared in the body only.
        let parameter_scope = scope.fork();
        let mut declared: Vec<String> = Vec::new();
        for (n, arg) in at.select("Arguments/*").iter().enumerate() {
            let events = self.generate(arg, &parameter_scope, Flags::default());
            let mut expr: Vec<String> = Vec::new();
            for data in split_exprs(events, &mut out) {
                expr.push(self.local_var(&data, scope, true));
                declared.push(data);
            }
            if expr.is_empty() {
                arguments.push(UNKNOWN_ARG.to_string());
                not_understood(&mut out, "Argument", n, arg.node());
            } else {
                if expr.len() == 1 {
                    expr.push("=".to_string());
                    expr.push("None".to_string());
                }
                arguments.push(expr.concat());
            }
        }

        out.push(Event::Line(format!("def {}({}):", name, arguments.join(", "))));
        out.push(Event::Begin(format!("block-def-{}", name)));
        for source in at.select("Source") {
            let body = scope.fork();
            body.declare_all(declared.iter().cloned());
            out.extend(self.generate_block(&source, &body, Flags::default()));
        }
        out.push(Event::End(format!("block-def-{}", name)));
        if anonymous {
            out.push(Event::Expr(name));
        }
        out
    }

    fn generate_variable(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let node = at.node();
        let name = node.get_or("name", "unnamed");
        let mut out = vec![Event::Expr(self.local_var(name, scope, true))];

        let mut values = 0usize;
        for value in at
            .children()
            .filter(|c| c.node().is("Value") || c.node().is("Expression"))
        {
            values += 1;
            out.push(Event::Expr("=".to_string()));
            let mut exprs = 0usize;
            for event in self.generate(&value, scope, Flags::inline()) {
                let event = match event.text() {
                    "qsa.Array(0)" => Event::Expr("[]".to_string()),
                    "[]" => Event::Expr("qsa.Array()".to_string()),
                    _ => event,
                };
                if matches!(event, Event::Expr(_)) {
                    exprs += 1;
                }
                out.push(event);
            }
            if exprs == 0 {
                out.push(Event::Expr("None".to_string()));
            }
        }

        if values == 0 && flags.force_value {
            match node.get("type") {
                None => out.push(Event::Expr(": Any = None".to_string())),
                Some(dtype) => {
                    out.push(Event::Expr("=".to_string()));
                    let default = match dtype {
                        "String" => "\"\"".to_string(),
                        "Number" => "0".to_string(),
                        "FLSqlCursor" | "FLTableDB" => "None".to_string(),
                        other => format!("{}()", self.local_var(other, scope, false)),
                    };
                    out.push(Event::Expr(default));
                }
            }
        }

        scope.declare(name);
        out
    }

    fn generate_declaration_block(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        _flags: Flags,
    ) -> Vec<Event> {
        let node = at.node();
        let is_constructor = node.get("constructor").is_some_and(|v| !v.is_empty());
        let is_definition = node.get("definition").is_some_and(|v| !v.is_empty());
        let var_flags = Flags {
            force_value: true,
            ..Flags::default()
        };

        let mut out = Vec::new();
        for (n, var) in at.children().enumerate() {
            let events = self.generate(&var, scope, var_flags);
            let mut expr = split_exprs(events, &mut out);
            if expr.is_empty() {
                not_understood(&mut out, "Declaration", n, var.node());
                continue;
            }
            if is_constructor {
                expr[0] = format!("self.{}", expr[0]);
            }
            if is_definition {
                // `form = self` becomes `form: qsa.FormDBWidget`,
                // `iface = ifaceCtx(self)` becomes `iface: ifaceCtx`.
                if expr[0] == "form" && expr.get(2).map(String::as_str) == Some("self") {
                    expr[1] = ":".to_string();
                    expr[2] = "qsa.FormDBWidget".to_string();
                } else if expr.len() > 2 {
                    expr[1] = ":".to_string();
                    expr[2] = expr[2].replace("(self)", "");
                }
            }
            out.push(Event::Line(expr.join(" ")));
        }
        out
    }

    fn generate_instruction_update(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        _flags: Flags,
    ) -> Vec<Event> {
        let mut out = Vec::new();
        let mut arguments = Vec::new();
        let mut identifier = None;

        for (n, arg) in at.children().enumerate() {
            let flags = Flags {
                isolate: Some(false),
                is_member: n == 0,
                ..Flags::default()
            };
            let events = self.generate(&arg, scope, flags);
            let expr: Vec<String> = split_exprs(events, &mut out)
                .into_iter()
                .map(|data| {
                    if data == "[]" {
                        "qsa.Array()".to_string()
                    } else {
                        data
                    }
                })
                .collect();
            if expr.is_empty() {
                arguments.push(UNKNOWN_ARG.to_string());
                not_understood(&mut out, "Argument", n, arg.node());
                continue;
            }
            if n == 0 && expr.len() == 1 {
                identifier = Some(expr[0].clone());
            }
            arguments.push(expr.join(" "));
        }

        out.push(Event::Line(arguments.join(" ")));
        if let Some(identifier) = identifier.filter(|i| !i.is_empty()) {
            scope.declare(identifier);
        }
        out
    }

    fn generate_inline_update(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
    ) -> Vec<Event> {
        let node = at.node();
        let mut out = Vec::new();
        let arguments: Vec<String> = at
            .children()
            .enumerate()
            .map(|(n, arg)| {
                self.joined_argument(&arg, scope, Flags::inline(), n, "Argument", UNKNOWN_ARG, &mut out)
            })
            .collect();
        let target = arguments
            .first()
            .cloned()
            .unwrap_or_else(|| UNKNOWN_ARG.to_string());

        let mut deferred = false;
        if !flags.plusplus_as_instruction {
            deferred = node.get("mode") == Some("read-update");
            out.push(Event::Expr(target.clone()));
        }

        let update = match node.get("type") {
            Some("PLUSPLUS") => format!("{} += 1", target),
            Some("MINUSMINUS") => format!("{} -= 1", target),
            other => {
                out.push(Event::Debug(format!(
                    "Inline update {} not understood",
                    other.unwrap_or("NONE")
                )));
                return out;
            }
        };
        out.push(if deferred {
            Event::LineAfter(update)
        } else {
            Event::Line(update)
        });
        out
    }

    fn generate_instruction_call(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        _flags: Flags,
    ) -> Vec<Event> {
        let mut out = Vec::new();
        let arguments: Vec<String> = at
            .children()
            .enumerate()
            .map(|(n, arg)| {
                self.joined_argument(&arg, scope, Flags::default(), n, "Argument", UNKNOWN_ARG, &mut out)
            })
            .collect();
        out.push(Event::Line(arguments.join(" ")));
        out
    }

    fn generate_instruction(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let arguments: Vec<String> = at
            .children()
            .enumerate()
            .map(|(n, arg)| {
                self.joined_argument(&arg, scope, Flags::default(), n, "Argument", UNKNOWN_ARG, &mut out)
            })
            .collect();
        if !arguments.is_empty() {
            out.push(Event::Debug(
                "Instruction: Maybe parse-error. This class is only for non-understood instructions or empty ones"
                    .to_string(),
            ));
            out.push(Event::Line(arguments.join(" ")));
        }
        out
    }

    fn generate_instruction_flow(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
    ) -> Vec<Event> {
        let mut out = Vec::new();
        let arguments: Vec<String> = at
            .children()
            .enumerate()
            .map(|(n, arg)| {
                self.joined_argument(&arg, scope, Flags::inline(), n, "Argument", UNKNOWN_ARG, &mut out)
            })
            .collect();
        let arguments = arguments.join(", ");

        match at.node().get("type") {
            Some("RETURN") => out.push(Event::Line(format!("return {}", arguments))),
            Some("BREAK") => {
                let text = format!("break {}", arguments);
                out.push(if flags.break_mode {
                    Event::Break(text)
                } else {
                    Event::Line(text)
                });
            }
            Some("CONTINUE") => out.push(Event::Line(format!("continue {}", arguments))),
            Some("THROW") => out.push(Event::Line(format!("raise Exception({})", arguments))),
            Some(other) => out.push(Event::Debug(format!(
                "Flow instruction {} not understood",
                other
            ))),
            None => {
                tracing::error!("Failed parsing AST: flow instruction without type");
            }
        }
        out
    }

    fn generate_delete(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let mut expr = Vec::new();
        for child in at.children() {
            let events = self.generate(&child, scope, Flags::inline());
            expr.extend(split_exprs(events, &mut out));
        }
        out.push(Event::Line(format!("del {}", expr.join(" "))));
        out
    }
}
