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

//! Path queries over the syntax tree.
//!
//! Paths are `/`-separated tag steps relative to a node, where `*` matches
//! any tag: `Source`, `Condition/*`, `Else/Source`, `CallArguments/*`.

use super::Node;

impl Node {
    /// Find all nodes matching a relative path, in document order.
    pub fn find_all<'a>(&'a self, path: &str) -> Vec<&'a Node> {
        let mut current: Vec<&'a Node> = vec![self];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|node| node.children.iter())
                .filter(|child| step == "*" || child.tag == step)
                .collect();
        }
        current
    }

    /// Find the first node matching a relative path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        self.find_all(path).into_iter().next()
    }

    /// Iterate over all descendants (not including `self`) in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Depth-first pre-order iterator over a node's descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
