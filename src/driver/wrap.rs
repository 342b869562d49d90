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

//! Module object wrapping.
//!
//! A QS script runs its top-level statements when the module loads. Python
//! gets the same effect from a synthetic class:
//!
//! ```text
//! Source                              Source
//!   Class a                             Class a
//!   DeclarationBlock x        =>        Class FormInternalObj(qsa.FormDBWidget)
//!   Function f                            Source
//!                                           DeclarationBlock x  definition=1
//!                                           Function _class_init
//!                                             Source
//!                                               DeclarationBlock x  constructor=1
//!                                           Function f
//! ```
//!
//! The `definition` copy becomes a class-level annotation, the
//! `constructor` copy a `self.`-qualified assignment.

use crate::ast::Node;
use crate::codegen::MODULE_CLASS;

/// Base class of the module object.
pub const MODULE_BASE: &str = "qsa.FormDBWidget";

/// Name of the module object's initialiser.
pub const CLASS_INIT: &str = "_class_init";

/// Wrap a script's top-level statements into the module object.
pub fn wrap_module(root: &Node) -> Node {
    let classes = root.children_named("Class").cloned();

    let mut init_body = Node::new("Source");
    let mut definitions = Vec::new();
    let mut functions = Vec::new();
    for child in &root.children {
        match child.tag.as_str() {
            "Class" => {}
            "Function" => functions.push(child.clone()),
            _ => {
                let mut definition = child.clone();
                definition.set("definition", "1");
                definitions.push(definition);

                let mut statement = child.clone();
                statement.set("constructor", "1");
                init_body.children.push(statement);
            }
        }
    }

    // Definitions are prepended one by one, so they end up reversed.
    definitions.reverse();
    let init = Node::new("Function")
        .with_attr("name", CLASS_INIT)
        .with_child(init_body);
    let body = Node::new("Source")
        .with_children(definitions)
        .with_child(init)
        .with_children(functions);
    let module = Node::new("Class")
        .with_attr("name", MODULE_CLASS)
        .with_attr("extends", MODULE_BASE)
        .with_child(body);

    Node::new("Source").with_children(classes).with_child(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    fn tags(node: &Node) -> Vec<String> {
        node.children
            .iter()
            .map(|c| match c.get("name") {
                Some(name) => format!("{}:{}", c.tag, name),
                None => c.tag.clone(),
            })
            .collect()
    }

    #[test]
    fn test_wrap_layout() {
        let root = parse_document(
            r#"<Source>
                <Class name="interna"><Source/></Class>
                <DeclarationBlock mode="VAR"><Variable name="form"/></DeclarationBlock>
                <Function name="init"><Source/></Function>
                <DeclarationBlock mode="VAR"><Variable name="iface"/></DeclarationBlock>
            </Source>"#,
        )
        .unwrap();
        let wrapped = wrap_module(&root);
        assert_eq!(tags(&wrapped), vec!["Class:interna", "Class:FormInternalObj"]);

        let module = &wrapped.children[1];
        assert_eq!(module.get("extends"), Some(MODULE_BASE));
        let body = &module.children[0];
        assert_eq!(
            tags(body),
            vec!["DeclarationBlock", "DeclarationBlock", "Function:_class_init", "Function:init"]
        );

        // Reversed, as each definition went to the front.
        assert_eq!(body.children[0].find("Variable").and_then(|v| v.get("name")), Some("iface"));
        assert_eq!(body.children[0].get("definition"), Some("1"));

        let init_body = &body.children[2].children[0];
        assert_eq!(init_body.children.len(), 2);
        assert!(init_body.children.iter().all(|c| c.get("constructor") == Some("1")));
        assert_eq!(init_body.children[0].find("Variable").and_then(|v| v.get("name")), Some("form"));
    }

    #[test]
    fn test_wrap_empty_script() {
        let wrapped = wrap_module(&Node::new("Source"));
        let body = &wrapped.children[0].children[0];
        assert_eq!(tags(body), vec!["Function:_class_init"]);
        assert!(body.children[0].children[0].children.is_empty());
    }
}
