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

//! Control flow code generation.
//!
//! This module provides code generation for control flow statements:
//! - if/else statements
//! - while and do-while loops
//! - C-style for loops and for-in loops
//! - fallthrough (`OldSwitch`) and iterator (`Switch`) switches
//! - try/catch
//! - with blocks
//!
//! Python lacks most of these forms, so several are rewritten into
//! `while` loops driven by synthetic `sNN_` flags. The counters behind
//! those names belong to the generator.

use super::context::{Cursor, Flags};
use super::events::{py_repr, py_repr_list, split_exprs, Event};
use super::{not_understood, CodeGenerator, UNKNOWN_ARG};
use crate::symbols::{Scope, WITH_KEYWORDS};
use std::collections::HashMap;

/// Extension trait for control flow code generation.
pub trait ControlFlowEmitter {
    /// Generate code for an if statement.
    fn generate_if(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate code for a try/catch statement.
    fn generate_try_catch(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate code for a while loop.
    fn generate_while(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate code for a do-while loop.
    fn generate_do_while(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate code for a C-style for loop.
    fn generate_for(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate code for a for-in loop.
    fn generate_for_in(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate code for a fallthrough switch.
    fn generate_old_switch(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags)
        -> Vec<Event>;

    /// Generate code for a switch using the runtime's case matcher.
    fn generate_switch(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;

    /// Generate code for a with block.
    fn generate_with(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event>;
}

impl CodeGenerator {
    /// Evaluate every node under `path` as one expression each.
    ///
    /// Unreadable expressions become `False` plus a diagnostic.
    fn expressions_at(
        &mut self,
        at: &Cursor<'_>,
        path: &str,
        scope: &Scope,
        out: &mut Vec<Event>,
    ) -> Vec<String> {
        at.select(path)
            .iter()
            .enumerate()
            .map(|(n, arg)| {
                self.joined_argument(arg, scope, Flags::inline(), n, "Expression", "False", out)
            })
            .collect()
    }

    fn next_key(counter: &mut u32) -> String {
        *counter += 1;
        format!("{:02x}", counter)
    }
}

/// Rewrite `x == true`, `x != null` and friends into idiomatic Python.
///
/// Only a condition of exactly three fragments is touched.
pub(crate) fn simplify_condition(expr: Vec<String>) -> Vec<String> {
    if expr.len() != 3 {
        return expr;
    }
    let subject = expr[0].clone();
    let rewritten: Option<Vec<String>> = match (expr[1].as_str(), expr[2].as_str()) {
        ("==", "True") | ("!=", "False") => Some(vec![subject]),
        ("==", "False") | ("!=", "True") => Some(vec!["not".into(), subject]),
        ("==", "None") => Some(vec![subject, "is".into(), "None".into()]),
        ("!=", "None") => Some(vec![subject, "is not".into(), "None".into()]),
        ("==", "float(\"nan\")") => Some(vec![format!("qsa.isnan({})", subject)]),
        ("!=", "float(\"nan\")") => Some(vec!["not".into(), format!("qsa.isnan({})", subject)]),
        _ => None,
    };
    rewritten.unwrap_or(expr)
}

/// Render events as a Python list of `(kind, text)` tuples.
fn repr_events(events: &[Event]) -> String {
    let items: Vec<String> = events
        .iter()
        .map(|e| format!("({}, {})", py_repr(e.kind()), py_repr(e.text())))
        .collect();
    format!("[{}]", items.join(", "))
}

/// Qualify cursor methods and bare `self` references inside a with block.
pub(crate) fn patch_with_text(text: String, subject: &str) -> String {
    let mut line = if text.contains("self)") {
        text.replace("self)", &format!("{})", subject))
    } else if text.contains("self ") {
        text.replace("self ", &format!("{} ", subject))
    } else {
        text
    };

    for keyword in WITH_KEYWORDS {
        let connect = format!("connect({}", keyword);
        if line.starts_with(keyword) {
            line = format!("{}.{}", subject, line);
        } else if line.starts_with(&connect) {
            line = line.replace(&connect, &format!("connect({}.{}", subject, keyword));
        } else if !line.contains('.') && line.contains(keyword) {
            line = line.replace(keyword, &format!("{}.{}", subject, keyword));
        }
    }
    line
}

impl ControlFlowEmitter for CodeGenerator {
    fn generate_if(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let mut conditions = Vec::new();

        for (n, arg) in at.select("Condition/*").iter().enumerate() {
            let mut expr = Vec::new();
            let mut stray = Vec::new();
            for event in self.generate(arg, scope, Flags::inline()) {
                match event {
                    Event::Expr(text) => expr.push(text),
                    Event::LineAfter(text) => {
                        out.push(Event::Debug(
                            "Inline update inside IF condition not allowed. Unexpected behavior."
                                .to_string(),
                        ));
                        stray.push(Event::Line(text));
                    }
                    other => stray.push(other),
                }
            }
            if !stray.is_empty() {
                out.push(Event::Debug(format!(
                    "Unexpected IF condition: {}",
                    repr_events(&stray)
                )));
                out.extend(stray);
            }

            if expr.is_empty() {
                conditions.push("False".to_string());
                not_understood(&mut out, "Expression", n, arg.node());
            } else {
                conditions.push(simplify_condition(expr).join(" "));
            }
        }

        out.push(Event::Line(format!("if {}:", conditions.join(" "))));
        let branch = Flags::breaking(flags.break_mode);
        for source in at.select("Source") {
            out.push(Event::Begin("block-if".to_string()));
            out.extend(self.generate_block(&source, scope, branch));
            out.push(Event::End("block-if".to_string()));
        }
        for source in at.select("Else/Source") {
            out.push(Event::Line("else:".to_string()));
            out.push(Event::Begin("block-else".to_string()));
            out.extend(self.generate_block(&source, scope, branch));
            out.push(Event::End("block-else".to_string()));
        }
        out
    }

    fn generate_try_catch(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let blocks = at.select("Source");
        if blocks.len() != 2 {
            out.push(Event::Debug(format!(
                "TryCatch expects a try and a catch block, found {} blocks",
                blocks.len()
            )));
        }

        out.push(Event::Line("try:".to_string()));
        out.push(Event::Begin("block-try".to_string()));
        if let Some(block) = blocks.first() {
            out.extend(self.generate(block, scope, Flags::breaking(flags.break_mode)));
        }
        out.push(Event::End("block-try".to_string()));

        let mut identifier = None;
        let ident_flags = Flags {
            isolate: Some(false),
            is_member: true,
            ..Flags::default()
        };
        for ident in at.select("Identifier") {
            let events = self.generate(&ident, scope, ident_flags);
            identifier = Some(split_exprs(events, &mut out).join(" "));
        }

        out.push(Event::Line("except Exception:".to_string()));
        out.push(Event::Begin("block-except".to_string()));
        if let Some(name) = identifier.as_deref().filter(|i| !i.is_empty()) {
            scope.declare(name);
            out.push(Event::Line(format!("{} = qsa.format_exc()", name)));
        }
        if let Some(block) = blocks.get(1) {
            let catch_flags = Flags {
                include_pass: identifier.is_none(),
                ..Flags::breaking(flags.break_mode)
            };
            out.extend(self.generate(block, scope, catch_flags));
        }
        out.push(Event::End("block-except".to_string()));
        out
    }

    fn generate_while(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let conditions = self.expressions_at(at, "Condition/*", scope, &mut out);

        out.push(Event::Line(format!("while {}:", conditions.join(" "))));
        for source in at.select("Source") {
            out.push(Event::Begin("block-while".to_string()));
            out.extend(self.generate_block(&source, scope, Flags::default()));
            out.push(Event::End("block-while".to_string()));
        }
        out
    }

    fn generate_do_while(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let conditions = self.expressions_at(at, "Condition/*", scope, &mut out);
        let first_loop = format!("s{}_dowhile_1stloop", Self::next_key(&mut self.do_while_count));

        out.push(Event::Line(format!("{} = True", first_loop)));
        out.push(Event::Line(format!(
            "while {} or {}:",
            first_loop,
            conditions.join(" ")
        )));
        for source in at.select("Source") {
            out.push(Event::Begin("block-while".to_string()));
            out.push(Event::Line(format!("{} = False", first_loop)));
            out.extend(self.generate(&source, scope, Flags::default()));
            out.push(Event::End("block-while".to_string()));
        }
        out
    }

    fn generate_for(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let guard = format!("s{}_while_pass", Self::next_key(&mut self.for_count));

        let mut init = Vec::new();
        for arg in at.select("ForInitialize/*") {
            let events = self.generate(&arg, scope, Flags::inline());
            let expr = split_exprs(events, &mut out);
            if expr.len() > 1 {
                init.push(expr.join(" "));
            }
        }
        if !init.is_empty() {
            out.push(Event::Line(init.join(" ")));
        }
        out.push(Event::Line(format!("{} = True", guard)));

        let mut increment = Vec::new();
        for arg in at.select("ForIncrement/*") {
            let mut expr = Vec::new();
            let mut lines = Vec::new();
            for event in self.generate(&arg, scope, Flags::inline()) {
                match event {
                    Event::Expr(text) => expr.push(text),
                    Event::Line(text) | Event::LineAfter(text) => lines.push(text),
                    other => out.push(other),
                }
            }
            // A bare expression such as `i += 2` is the increment itself.
            if lines.is_empty() && !expr.is_empty() {
                lines.push(expr.join(" "));
            }
            increment.extend(lines);
        }

        let mut compare = Vec::new();
        for arg in at.select("ForCompare/*") {
            let events = self.generate(&arg, scope, Flags::inline());
            let expr = split_exprs(events, &mut out);
            compare.push(if expr.is_empty() {
                "True".to_string()
            } else {
                expr.join(" ")
            });
        }
        let condition = if compare.is_empty() {
            "True".to_string()
        } else {
            compare.join(" ")
        };

        out.push(Event::Line(format!("while {}:", condition)));
        out.push(Event::Begin("block-for".to_string()));
        out.push(Event::Line(format!("if not {}:", guard)));
        out.push(Event::Begin("block-while_pass".to_string()));
        out.extend(increment.iter().cloned().map(Event::Line));
        out.push(Event::Line(format!("{} = True", guard)));
        out.push(Event::Line("continue".to_string()));
        out.push(Event::End("block-while_pass".to_string()));
        out.push(Event::Line(format!("{} = False", guard)));

        let body_flags = Flags {
            include_pass: false,
            ..Flags::default()
        };
        for source in at.select("Source") {
            out.extend(self.generate(&source, scope, body_flags));
        }
        out.extend(increment.iter().cloned().map(Event::Line));
        out.push(Event::Line(format!("{} = True", guard)));

        // Conditions like `s.charAt(i) != ""` raise once out of range.
        out.push(Event::Line("try:".to_string()));
        out.push(Event::Begin("block-error-catch".to_string()));
        out.push(Event::Line(condition));
        out.push(Event::End("block-error-catch".to_string()));
        out.push(Event::Line("except Exception:".to_string()));
        out.push(Event::Begin("block-except".to_string()));
        out.push(Event::Line("break".to_string()));
        out.push(Event::End("block-except".to_string()));
        out.push(Event::End("block-for".to_string()));
        out
    }

    fn generate_for_in(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let operand_flags = Flags {
            isolate: Some(false),
            is_member: true,
            ..Flags::default()
        };

        let mut operands = Vec::new();
        for child in at.children() {
            if child.node().is("Source") {
                break;
            }
            let operand = if child.node().is("ForInitialize") {
                child.nth_child(0)
            } else {
                Some(child)
            };
            let text = match operand {
                Some(operand) => {
                    let events = self.generate(&operand, scope, operand_flags);
                    split_exprs(events, &mut out).join(" ")
                }
                None => String::new(),
            };
            operands.push(text);
        }

        if operands.len() != 2 {
            out.push(Event::Debug(format!(
                "FOR-IN expects 2 operands, found {}",
                operands.len()
            )));
        }
        operands.resize(2, String::new());
        for operand in operands.iter_mut().filter(|o| o.is_empty()) {
            *operand = UNKNOWN_ARG.to_string();
        }
        out.push(Event::Debug(format!("FOR-IN: {}", py_repr_list(&operands))));
        out.push(Event::Line(format!("for {} in {}:", operands[0], operands[1])));

        let body_flags = Flags {
            include_pass: false,
            ..Flags::default()
        };
        for source in at.select("Source") {
            let body = scope.fork();
            body.declare(operands[0].clone());
            out.push(Event::Begin("block-for-in".to_string()));
            out.extend(self.generate_block(&source, &body, body_flags));
            out.push(Event::End("block-for-in".to_string()));
        }
        out
    }

    fn generate_old_switch(
        &mut self,
        at: &Cursor<'_>,
        scope: &Scope,
        _flags: Flags,
    ) -> Vec<Event> {
        let mut out = Vec::new();
        let key = Self::next_key(&mut self.switch_count);
        let when = format!("s{}_when", key);
        let do_work = format!("s{}_do_work", key);
        let work_done = format!("s{}_work_done", key);

        let subject = self.expressions_at(at, "Condition/*", scope, &mut out);
        out.push(Event::Line(format!("{} = {}", when, subject.join(" "))));
        out.push(Event::Line(format!("{}, {} = False, False", do_work, work_done)));

        let matched = format!("{}, {} = True, True", do_work, work_done);
        let case_flags = Flags::breaking(true);

        for case in at.select("Case") {
            let values = self.expressions_at(&case, "Value", scope, &mut out);
            out.push(Event::Line(format!("if {} == {}:", when, values.join(" "))));
            out.push(Event::Begin("block-if".to_string()));
            out.push(Event::Line(matched.clone()));
            out.push(Event::End("block-if".to_string()));
            out.push(Event::Line(format!("if {}:", do_work)));
            out.push(Event::Begin("block-if".to_string()));
            let mut count = 0usize;
            for source in case.select("Source") {
                for event in self.generate_block(&source, scope, case_flags) {
                    count += 1;
                    out.push(match event {
                        Event::Break(_) => Event::Line(format!("{} = False  # BREAK", do_work)),
                        other => other,
                    });
                }
            }
            if count == 0 {
                out.push(Event::Line("pass".to_string()));
            }
            out.push(Event::End("block-if".to_string()));
        }

        for default in at.select("CaseDefault") {
            out.push(Event::Line(format!("if not {}:", work_done)));
            out.push(Event::Begin("block-if".to_string()));
            out.push(Event::Line(matched.clone()));
            out.push(Event::End("block-if".to_string()));
            out.push(Event::Line(format!("if {}:", do_work)));
            out.push(Event::Begin("block-if".to_string()));
            for source in default.select("Source") {
                for event in self.generate_block(&source, scope, case_flags) {
                    out.push(match event {
                        Event::Break(_) => Event::Line(format!("{} = False  # BREAK", do_work)),
                        other => other,
                    });
                }
            }
            out.push(Event::End("block-if".to_string()));
        }
        out
    }

    fn generate_switch(&mut self, at: &Cursor<'_>, scope: &Scope, _flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let subject = self.expressions_at(at, "Condition/*", scope, &mut out);
        out.push(Event::Line(format!(
            "for case in qsa.switch({}):",
            subject.join(" ")
        )));
        out.push(Event::Begin("block-for".to_string()));

        for case in at.select("Case") {
            let values = self.expressions_at(&case, "Value", scope, &mut out);
            out.push(Event::Line(format!("if case({}):", values.join(" "))));
            out.push(Event::Begin("block-if".to_string()));
            for source in case.select("Source") {
                out.extend(self.generate_block(&source, scope, Flags::default()));
            }
            out.push(Event::End("block-if".to_string()));
        }
        for default in at.select("CaseDefault") {
            out.push(Event::Line("if case():".to_string()));
            out.push(Event::Begin("block-if".to_string()));
            for source in default.select("Source") {
                out.extend(self.generate_block(&source, scope, Flags::default()));
            }
            out.push(Event::End("block-if".to_string()));
        }

        out.push(Event::End("block-for".to_string()));
        out
    }

    fn generate_with(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let mut out = Vec::new();
        let children: Vec<Cursor<'_>> = at.children().collect();
        if children.len() != 2 {
            out.push(Event::Debug(format!(
                "WITH expects a subject and a block, found {} children",
                children.len()
            )));
        }

        let mut subject = match children.first() {
            Some(variable) => {
                let events = self.generate(variable, scope, Flags::inline());
                split_exprs(events, &mut out)
            }
            None => Vec::new(),
        };
        if subject.is_empty() {
            subject.push("None".to_string());
            out.push(Event::Debug("Expression not understood".to_string()));
        }
        let subject = subject.join(" ");

        out.push(Event::Line(" #WITH_START".to_string()));
        if let Some(source) = children.get(1) {
            let transform: HashMap<String, String> = WITH_KEYWORDS
                .iter()
                .map(|kw| (kw.to_string(), format!("{}.{}", subject, kw)))
                .collect();
            let body = scope.with_transform(transform);
            body.declare(subject.clone());
            for event in self.generate_block(source, &body, Flags::breaking(flags.break_mode)) {
                out.push(event.map_text(|text| patch_with_text(text, &subject)));
            }
        }
        out.push(Event::Line(" #WITH_END".to_string()));
        out
    }
}
