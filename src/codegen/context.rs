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

//! Traversal context.
//!
//! A [`Cursor`] is a node together with the chain of its ancestors, built
//! while descending. Handlers use it for the parent and grandparent checks
//! that decide things like implicit `self` or `super()` calls.

use crate::ast::Node;

/// A node plus its ancestor chain (root first, current node last).
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    path: Vec<&'a Node>,
}

impl<'a> Cursor<'a> {
    /// Start a traversal at `root`.
    pub fn root(root: &'a Node) -> Self {
        Self { path: vec![root] }
    }

    /// The current node.
    pub fn node(&self) -> &'a Node {
        self.path[self.path.len() - 1]
    }

    /// The parent of the current node.
    pub fn parent(&self) -> Option<&'a Node> {
        self.ancestor(1)
    }

    /// The parent of the parent.
    pub fn grandparent(&self) -> Option<&'a Node> {
        self.ancestor(2)
    }

    fn ancestor(&self, levels: usize) -> Option<&'a Node> {
        self.path
            .len()
            .checked_sub(levels + 1)
            .map(|index| self.path[index])
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.path.iter().rev().skip(1).copied()
    }

    /// Descend into a child of the current node.
    pub fn child(&self, node: &'a Node) -> Cursor<'a> {
        let mut path = self.path.clone();
        path.push(node);
        Cursor { path }
    }

    /// Cursors for every direct child.
    pub fn children(&self) -> impl Iterator<Item = Cursor<'a>> + '_ {
        self.node().children.iter().map(move |c| self.child(c))
    }

    /// Cursors for the n-th direct child.
    pub fn nth_child(&self, index: usize) -> Option<Cursor<'a>> {
        self.node().children.get(index).map(|c| self.child(c))
    }

    /// Cursors for every node matching a relative path such as `Else/Source`,
    /// keeping the intermediate nodes in the ancestor chain.
    pub fn select(&self, path: &str) -> Vec<Cursor<'a>> {
        let mut current = vec![self.clone()];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .iter()
                .flat_map(|cursor| {
                    cursor
                        .node()
                        .children
                        .iter()
                        .filter(|c| step == "*" || c.tag == step)
                        .map(|c| cursor.child(c))
                        .collect::<Vec<_>>()
                })
                .collect();
        }
        current
    }

    /// Depth of the current node (root is 0).
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }
}

/// Options a parent passes to the handler of one child.
///
/// Every call starts from [`Flags::default`]; options are not inherited
/// unless the parent passes them on explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Wrap the expression in parentheses. `None` keeps the handler's default.
    pub isolate: Option<bool>,
    /// The identifier names a member, not a free-standing reference.
    pub is_member: bool,
    /// `break` statements are reported as [`Event::Break`](super::Event::Break).
    pub break_mode: bool,
    /// Emit `pass` for a block without lines.
    pub include_pass: bool,
    /// Declarations without a value get a default one.
    pub force_value: bool,
    /// Inline updates (`x++`) stand alone as a statement.
    pub plusplus_as_instruction: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            isolate: None,
            is_member: false,
            break_mode: false,
            include_pass: true,
            force_value: false,
            plusplus_as_instruction: false,
        }
    }
}

impl Flags {
    /// Default flags without parentheses around expressions.
    pub fn inline() -> Self {
        Self {
            isolate: Some(false),
            ..Self::default()
        }
    }

    /// Default flags with `is_member` set.
    pub fn member(is_member: bool) -> Self {
        Self {
            is_member,
            ..Self::default()
        }
    }

    /// Default flags with `break_mode` set.
    pub fn breaking(break_mode: bool) -> Self {
        Self {
            break_mode,
            ..Self::default()
        }
    }
}
