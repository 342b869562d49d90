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

//! Code generation module for the qsapy transpiler.
//!
//! This module walks the QS syntax tree and produces a stream of emission
//! events for the renderer. It handles:
//! - Dispatching every tag to its handler
//! - Statements, declarations and classes
//! - Control flow rewrites (C-style for, do-while, fallthrough switch, with)
//! - Expressions and operators
//! - Member-call rewriting
//! - Regex literals
//!
//! Generation never fails. Constructs that cannot be translated become
//! `# DEBUG::` comments and placeholder names in the output.
//!
//! # Module Structure
//!
//! - `context` - Traversal cursor and per-call flags
//! - `control_flow` - Loops, switches, if/else, try/catch, with (ControlFlowEmitter trait)
//! - `events` - Emission event type
//! - `expressions` - Expressions, operators and calls (ExpressionEmitter trait)
//! - `members` - Member chains and the call rewrite table (MemberEmitter trait)
//! - `regex` - Regex literal handlers (RegexEmitter trait)
//! - `registry` - Tag to handler lookup
//! - `statements` - Blocks, classes, functions and simple statements (StatementEmitter trait)
//! - `trace` - Handler trace file

mod context;
mod control_flow;
mod events;
mod expressions;
mod members;
mod regex;
mod registry;
mod statements;
mod trace;

pub use context::{Cursor, Flags};
pub use control_flow::ControlFlowEmitter;
pub use events::Event;
pub use expressions::ExpressionEmitter;
pub use members::MemberEmitter;
pub use regex::RegexEmitter;
pub use registry::{handler_for, HandlerKind};
pub use statements::{StatementEmitter, MODULE_CLASS};
pub use trace::TraceSink;

pub(crate) use events::{py_repr, py_repr_list, split_exprs};

use crate::ast::Node;
use crate::symbols::{id_translate, Scope};
use std::sync::Arc;

/// Placeholder for arguments that produced no expression.
pub const UNKNOWN_ARG: &str = "unknownarg";

/// The code generator.
///
/// One generator serves one transpilation run. The counters behind the
/// synthetic `sNN_` names live here, so separate runs never share them.
pub struct CodeGenerator {
    /// Unresolved identifiers are marked instead of passed through.
    strict: bool,
    /// Fallthrough switches generated so far.
    switch_count: u32,
    /// Do-while loops generated so far.
    do_while_count: u32,
    /// C-style for loops generated so far.
    for_count: u32,
    /// Name-prefix groups that already got a `@class_definition` marker.
    classes_defined: Vec<String>,
    /// Optional handler trace.
    trace: Option<Arc<TraceSink>>,
}

impl CodeGenerator {
    /// Create a new code generator.
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            switch_count: 0,
            do_while_count: 0,
            for_count: 0,
            classes_defined: Vec::new(),
            trace: None,
        }
    }

    /// Record every handler invocation in `sink`.
    pub fn with_trace(mut self, sink: Arc<TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Whether unresolved identifiers are marked.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Generate events for a whole tree.
    pub fn generate_root(&mut self, root: &Node) -> Vec<Event> {
        let cursor = Cursor::root(root);
        self.generate(&cursor, &Scope::new(), Flags::default())
    }

    /// Generate events for a node.
    ///
    /// A `Source` block works on a copy of `scope`; use
    /// [`generate_block`](Self::generate_block) to hand it a shared one.
    pub fn generate(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        let kind = handler_for(&at.node().tag);
        self.traced(at, kind, |gen| gen.dispatch(kind, at, scope, flags))
    }

    /// Generate a `Source` block with exactly the given scope.
    pub fn generate_block(&mut self, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        self.traced(at, HandlerKind::Source, |gen| gen.generate_source(at, scope, flags))
    }

    fn dispatch(&mut self, kind: HandlerKind, at: &Cursor<'_>, scope: &Scope, flags: Flags) -> Vec<Event> {
        match kind {
            HandlerKind::Source => {
                let block = scope.fork();
                self.generate_source(at, &block, flags)
            }
            HandlerKind::Class => self.generate_class(at, scope, flags),
            HandlerKind::Function | HandlerKind::FunctionAnon => self.generate_function(at, scope, flags),
            HandlerKind::FunctionCall | HandlerKind::FunctionAnonExec => {
                self.generate_function_call(at, scope, flags)
            }
            HandlerKind::If => self.generate_if(at, scope, flags),
            HandlerKind::TryCatch => self.generate_try_catch(at, scope, flags),
            HandlerKind::While => self.generate_while(at, scope, flags),
            HandlerKind::DoWhile => self.generate_do_while(at, scope, flags),
            HandlerKind::For => self.generate_for(at, scope, flags),
            HandlerKind::ForIn => self.generate_for_in(at, scope, flags),
            HandlerKind::OldSwitch => self.generate_old_switch(at, scope, flags),
            HandlerKind::Switch => self.generate_switch(at, scope, flags),
            HandlerKind::With => self.generate_with(at, scope, flags),
            HandlerKind::Variable => self.generate_variable(at, scope, flags),
            HandlerKind::InstructionUpdate => self.generate_instruction_update(at, scope, flags),
            HandlerKind::InlineUpdate => self.generate_inline_update(at, scope, flags),
            HandlerKind::InstructionCall => self.generate_instruction_call(at, scope, flags),
            HandlerKind::Instruction => self.generate_instruction(at, scope, flags),
            HandlerKind::InstructionFlow => self.generate_instruction_flow(at, scope, flags),
            HandlerKind::Member => self.generate_member(at, scope, flags),
            HandlerKind::ArrayMember => self.generate_array_member(at, scope, flags),
            HandlerKind::Value => self.generate_value(at, scope, flags),
            HandlerKind::Expression => self.generate_expression(at, scope, flags),
            HandlerKind::Parentheses => self.generate_parentheses(at, scope, flags),
            HandlerKind::Delete => self.generate_delete(at, scope, flags),
            HandlerKind::OpTernary => self.generate_ternary(at, scope, flags),
            HandlerKind::DictObject => self.generate_dict_object(at, scope, flags),
            HandlerKind::DictElem => self.generate_dict_elem(at, scope, flags),
            HandlerKind::OpUnary => self.generate_unary(at, scope, flags),
            HandlerKind::New => self.generate_new(at, scope, flags),
            HandlerKind::Constant => self.generate_constant(at, scope, flags),
            HandlerKind::Identifier => self.generate_identifier(at, scope, flags),
            HandlerKind::Regex => self.generate_regex(at, scope, flags),
            HandlerKind::RegexBody => self.generate_regex_body(at, scope, flags),
            HandlerKind::RegexChar => self.generate_regex_char(at, scope, flags),
            HandlerKind::OpUpdate => self.generate_op_update(at),
            HandlerKind::Compare => self.generate_compare(at),
            HandlerKind::OpMath => self.generate_op_math(at),
            HandlerKind::DeclarationBlock => self.generate_declaration_block(at, scope, flags),
            HandlerKind::Unknown => vec![Event::Debug(format!(
                "* not-known-seq * {}",
                at.node().to_xml()
            ))],
        }
    }

    fn traced(
        &mut self,
        at: &Cursor<'_>,
        kind: HandlerKind,
        run: impl FnOnce(&mut Self) -> Vec<Event>,
    ) -> Vec<Event> {
        let Some(sink) = self.trace.clone() else {
            return run(self);
        };
        let depth = at.depth();
        sink.record(depth, kind.name(), "begin-gen");
        let events = run(self);
        for event in &events {
            sink.record(depth, kind.name(), &event.to_string());
        }
        sink.record(depth, kind.name(), "end-gen");
        events
    }

    /// Resolve an identifier; members and empty names skip the scope.
    pub(crate) fn local_var(&self, name: &str, scope: &Scope, is_member: bool) -> String {
        if name.is_empty() {
            return String::new();
        }
        if is_member {
            id_translate(name, None, None, self.strict)
        } else {
            scope.resolve(name, self.strict)
        }
    }

    /// Translate a name that is neither local nor a member (declarations).
    pub(crate) fn other_var(&self, name: &str) -> String {
        id_translate(name, None, None, self.strict)
    }

    /// Generate one argument-like child and join its expression fragments.
    ///
    /// Non-expression events go to `out`. An argument without fragments
    /// becomes `placeholder` plus two diagnostics.
    pub(crate) fn joined_argument(
        &mut self,
        arg: &Cursor<'_>,
        scope: &Scope,
        flags: Flags,
        index: usize,
        label: &str,
        placeholder: &str,
        out: &mut Vec<Event>,
    ) -> String {
        let events = self.generate(arg, scope, flags);
        let exprs = split_exprs(events, out);
        if exprs.is_empty() {
            not_understood(out, label, index, arg.node());
            placeholder.to_string()
        } else {
            exprs.join(" ")
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Report a child that produced no expression.
pub(crate) fn not_understood(out: &mut Vec<Event>, label: &str, index: usize, node: &Node) {
    out.push(Event::Debug(format!("{} {} not understood", label, index)));
    out.push(Event::Debug(node.to_xml()));
}

/// Generate events for a syntax tree with a fresh generator.
pub fn generate(root: &Node, strict: bool) -> Vec<Event> {
    CodeGenerator::new(strict).generate_root(root)
}


#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;

    #[test]
    fn test_unknown_tag_becomes_debug() {
        let events = events_for("<Source><Frobnicate a=\"1\"/></Source>");
        assert_eq!(
            events,
            vec![Event::Debug("* not-known-seq * <Frobnicate a=\"1\" />".to_string())]
        );
    }

    #[test]
    fn test_unknown_tag_does_not_stop_siblings() {
        let lines = lines_for(
            "<Source><Frobnicate/><InstructionFlow type=\"RETURN\"/></Source>",
        );
        assert_eq!(lines, vec!["return "]);
    }

    #[test]
    fn test_empty_source_emits_pass() {
        assert_eq!(lines_for("<Source/>"), vec!["pass"]);
    }

    #[test]
    fn test_trace_records_handlers() {
        use std::io::Write;
        use std::sync::Mutex;

        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);
        impl Write for Buffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let sink = Arc::new(TraceSink::from_writer(buffer.clone()));
        let root = crate::parser::parse_document("<Source/>").unwrap();
        CodeGenerator::new(true).with_trace(sink).generate_root(&root);
        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(text.starts_with("0001 Source: begin-gen\n"));
        assert!(text.contains("Source: line: pass"));
        assert!(text.trim_end().ends_with("Source: end-gen"));
    }
}
