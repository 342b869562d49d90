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

//! Lexical scope records.
//!
//! QS variables are function scoped, so some blocks hand their children the
//! very same record (`share`) while real nested scopes get an independent
//! copy (`fork`). Records hold no tree references.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::id_translate;

/// Locally declared names plus identifier redirections of one block.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    locals: Rc<RefCell<HashSet<String>>>,
    transform: Rc<RefCell<HashMap<String, String>>>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias this scope: declarations made through either handle are seen by both.
    pub fn share(&self) -> Self {
        self.clone()
    }

    /// Copy this scope: later declarations do not leak back.
    pub fn fork(&self) -> Self {
        Self {
            locals: Rc::new(RefCell::new(self.locals.borrow().clone())),
            transform: Rc::new(RefCell::new(self.transform.borrow().clone())),
        }
    }

    /// Share the locals but replace the redirection map.
    pub fn with_transform(&self, transform: HashMap<String, String>) -> Self {
        Self {
            locals: Rc::clone(&self.locals),
            transform: Rc::new(RefCell::new(transform)),
        }
    }

    /// Declare a local name.
    pub fn declare(&self, name: impl Into<String>) {
        self.locals.borrow_mut().insert(name.into());
    }

    /// Declare several local names.
    pub fn declare_all<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut locals = self.locals.borrow_mut();
        locals.extend(names.into_iter().map(Into::into));
    }

    /// Declare a name together with its replacement text.
    pub fn declare_redirect(&self, name: impl Into<String>, replacement: impl Into<String>) {
        self.transform.borrow_mut().insert(name.into(), replacement.into());
    }

    /// Whether `name` was declared in this scope.
    pub fn is_declared(&self, name: &str) -> bool {
        self.locals.borrow().contains(name)
    }

    /// Resolve an identifier against this scope.
    pub fn resolve(&self, name: &str, strict: bool) -> String {
        let locals = self.locals.borrow();
        let transform = self.transform.borrow();
        id_translate(name, Some(&locals), Some(&transform), strict)
    }
}
