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

//! Tag to handler registry.
//!
//! Lookup is by exact tag first, then by the extra tags a handler accepts.
//! Anything else goes to [`HandlerKind::Unknown`].

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The handler responsible for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Source,
    Class,
    Function,
    FunctionAnon,
    FunctionCall,
    FunctionAnonExec,
    If,
    TryCatch,
    While,
    DoWhile,
    For,
    ForIn,
    OldSwitch,
    Switch,
    With,
    Variable,
    InstructionUpdate,
    InlineUpdate,
    InstructionCall,
    Instruction,
    InstructionFlow,
    Member,
    ArrayMember,
    Value,
    Expression,
    Parentheses,
    Delete,
    OpTernary,
    DictObject,
    DictElem,
    OpUnary,
    New,
    Constant,
    Identifier,
    Regex,
    RegexBody,
    RegexChar,
    OpUpdate,
    Compare,
    OpMath,
    DeclarationBlock,
    Unknown,
}

impl HandlerKind {
    /// All handlers with their own tag, in registration order.
    pub const ALL: &'static [(HandlerKind, &'static str)] = &[
        (HandlerKind::Source, "Source"),
        (HandlerKind::Class, "Class"),
        (HandlerKind::Function, "Function"),
        (HandlerKind::FunctionAnon, "FunctionAnon"),
        (HandlerKind::FunctionCall, "FunctionCall"),
        (HandlerKind::FunctionAnonExec, "FunctionAnonExec"),
        (HandlerKind::If, "If"),
        (HandlerKind::TryCatch, "TryCatch"),
        (HandlerKind::While, "While"),
        (HandlerKind::DoWhile, "DoWhile"),
        (HandlerKind::For, "For"),
        (HandlerKind::ForIn, "ForIn"),
        (HandlerKind::OldSwitch, "OldSwitch"),
        (HandlerKind::Switch, "Switch"),
        (HandlerKind::With, "With"),
        (HandlerKind::Variable, "Variable"),
        (HandlerKind::InstructionUpdate, "InstructionUpdate"),
        (HandlerKind::InlineUpdate, "InlineUpdate"),
        (HandlerKind::InstructionCall, "InstructionCall"),
        (HandlerKind::Instruction, "Instruction"),
        (HandlerKind::InstructionFlow, "InstructionFlow"),
        (HandlerKind::Member, "Member"),
        (HandlerKind::ArrayMember, "ArrayMember"),
        (HandlerKind::Value, "Value"),
        (HandlerKind::Expression, "Expression"),
        (HandlerKind::Parentheses, "Parentheses"),
        (HandlerKind::Delete, "Delete"),
        (HandlerKind::OpTernary, "OpTernary"),
        (HandlerKind::DictObject, "DictObject"),
        (HandlerKind::DictElem, "DictElem"),
        (HandlerKind::OpUnary, "OpUnary"),
        (HandlerKind::New, "New"),
        (HandlerKind::Constant, "Constant"),
        (HandlerKind::Identifier, "Identifier"),
        (HandlerKind::Regex, "regex"),
        (HandlerKind::RegexBody, "regexbody"),
        (HandlerKind::RegexChar, "regexchar"),
        (HandlerKind::OpUpdate, "OpUpdate"),
        (HandlerKind::Compare, "Compare"),
        (HandlerKind::OpMath, "OpMath"),
        (HandlerKind::DeclarationBlock, "DeclarationBlock"),
    ];

    /// Extra tags accepted by a handler besides its own.
    const EXTRA_TAGS: &'static [(HandlerKind, &'static str)] = &[
        (HandlerKind::Expression, "base_expression"),
        (HandlerKind::Expression, "math_expression"),
    ];

    /// Handler name, used in trace output.
    pub fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, tag)| *tag)
            .unwrap_or("Unknown")
    }
}

static BY_TAG: Lazy<HashMap<&'static str, HandlerKind>> = Lazy::new(|| {
    HandlerKind::ALL
        .iter()
        .map(|(kind, tag)| (*tag, *kind))
        .collect()
});

static BY_EXTRA_TAG: Lazy<HashMap<&'static str, HandlerKind>> = Lazy::new(|| {
    HandlerKind::EXTRA_TAGS
        .iter()
        .map(|(kind, tag)| (*tag, *kind))
        .collect()
});

/// Find the handler for a tag.
pub fn handler_for(tag: &str) -> HandlerKind {
    BY_TAG
        .get(tag)
        .or_else(|| BY_EXTRA_TAG.get(tag))
        .copied()
        .unwrap_or(HandlerKind::Unknown)
}
