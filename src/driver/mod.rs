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

//! Transpilation driver.
//!
//! Ties the stages together: parse the XML, wrap the module object, pick
//! the output template, generate, render and optionally format.
//!
//! # Module Structure
//!
//! - `wrap` - Module object wrapping pass
//! - `batch` - Parallel conversion of many files

mod batch;
mod wrap;

pub use batch::{
    convert_batch, convert_batch_with, pending, worker_count, BatchSummary, ConversionItem,
    PendingRegistry,
};
pub use wrap::{wrap_module, CLASS_INIT, MODULE_BASE};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ast::Node;
use crate::codegen::{CodeGenerator, Event, TraceSink};
use crate::error::{Result, TranspileError};
use crate::output::{format_python, render, write_file};
use crate::parser::parse_document;

/// Extension appended to converted files.
pub const PYTHON_SUFFIX: &str = ".py";

/// Root attribute selecting the output template.
pub const TEMPLATE_ATTR: &str = "parser-template";

/// Options for one transpilation.
#[derive(Debug, Clone)]
pub struct TranspileOptions {
    /// Mark unresolved identifiers instead of passing them through.
    pub strict: bool,
    /// Run `black` over the output if it is installed.
    pub format: bool,
    /// Import path of the runtime support library.
    pub runtime_module: String,
    /// Known references: alias to (module path, name).
    pub import_refs: BTreeMap<String, (String, String)>,
    /// Optional handler trace.
    pub trace: Option<Arc<TraceSink>>,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            strict: true,
            format: true,
            runtime_module: "pineboolib.qsa".to_string(),
            import_refs: BTreeMap::new(),
            trace: None,
        }
    }
}

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// A complete module with imports and the module object.
    File,
    /// Just the generated code, for snippets compiled at runtime.
    Expression,
}

impl Template {
    /// The template a tree asks for.
    pub fn for_root(root: &Node) -> Self {
        match root.get(TEMPLATE_ATTR) {
            None | Some("file_template") => Template::File,
            Some("expression_template") => Template::Expression,
            Some(other) => {
                tracing::warn!("unknown template {}, using file_template", other);
                Template::File
            }
        }
    }
}

fn line(text: impl Into<String>) -> Event {
    Event::Line(text.into())
}

/// Known references actually used by the tree.
fn used_refs<'a>(
    root: &Node,
    refs: &'a BTreeMap<String, (String, String)>,
) -> Vec<(&'a String, &'a (String, String))> {
    if refs.is_empty() {
        return Vec::new();
    }
    refs.iter()
        .filter(|(alias, _)| {
            root.descendants()
                .any(|n| n.is("Identifier") && n.get("name") == Some(alias.as_str()))
        })
        .collect()
}

/// Header lines of a file module.
fn file_header(root: &Node, options: &TranspileOptions) -> Vec<Event> {
    let mut out = vec![
        line("# -*- coding: utf-8 -*-"),
        line(format!("# Translated with {} {}", crate::NAME, crate::VERSION)),
        line("from typing import TYPE_CHECKING, Any"),
    ];
    if !options.strict {
        out.push(line(format!(
            "from {}.qsa import *  # noqa: F403",
            options.runtime_module
        )));
    }
    out.push(line(format!("from {} import qsa", options.runtime_module)));
    for (alias, (path, name)) in used_refs(root, &options.import_refs) {
        out.push(line(format!("from {} import {} as {}", path, name, alias)));
    }
    out.extend(["", "# /** @file */", "", ""].map(line));
    out
}

/// Trailer exposing the module object to type checkers.
fn file_trailer() -> Vec<Event> {
    [
        "",
        "if TYPE_CHECKING:",
        "    form: FormInternalObj = FormInternalObj()",
        "    iface = form.iface",
        "else:",
        "    form = None",
    ]
    .map(line)
    .into()
}

/// All events for a tree, template included.
pub fn template_events(root: &Node, options: &TranspileOptions) -> Vec<Event> {
    let mut generator = CodeGenerator::new(options.strict);
    if let Some(trace) = &options.trace {
        generator = generator.with_trace(Arc::clone(trace));
    }

    match Template::for_root(root) {
        Template::Expression => generator.generate_root(root),
        Template::File => {
            let mut out = file_header(root, options);
            out.extend(generator.generate_root(&wrap_module(root)));
            out.extend(file_trailer());
            out
        }
    }
}

/// Transpile a parsed tree into Python text.
pub fn transpile_tree(root: &Node, options: &TranspileOptions) -> String {
    let text = render(&template_events(root, options));
    if let Some(trace) = &options.trace {
        if let Err(err) = trace.flush() {
            tracing::debug!("trace flush failed: {}", err);
        }
    }
    if options.format {
        format_python(&text)
    } else {
        text
    }
}

/// Transpile an XML document held in memory.
pub fn pythonize_str(xml: &str, options: &TranspileOptions) -> Result<String> {
    let root = parse_document(xml)?;
    Ok(transpile_tree(&root, options))
}

/// Transpile the XML file at `src` into `dst`.
pub fn pythonize(src: &Path, dst: &Path, options: &TranspileOptions) -> Result<()> {
    let xml = std::fs::read_to_string(src).map_err(|e| TranspileError::read(src, e))?;
    let text = pythonize_str(&xml, options)?;
    write_file(&text, dst)
}

/// Where the Python file for `src` goes.
///
/// Next to the source with [`PYTHON_SUFFIX`] appended, or inside `dir`.
pub fn destination_for(src: &Path, dir: Option<&Path>) -> PathBuf {
    let mut name = src.file_name().unwrap_or(src.as_os_str()).to_os_string();
    name.push(PYTHON_SUFFIX);
    match dir {
        Some(dir) => dir.join(name),
        None => src.with_file_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain() -> TranspileOptions {
        TranspileOptions {
            format: false,
            ..TranspileOptions::default()
        }
    }

    #[test]
    fn test_template_selection() {
        assert_eq!(Template::for_root(&Node::new("Source")), Template::File);
        let expr = Node::new("Source").with_attr(TEMPLATE_ATTR, "expression_template");
        assert_eq!(Template::for_root(&expr), Template::Expression);
        let odd = Node::new("Source").with_attr(TEMPLATE_ATTR, "other");
        assert_eq!(Template::for_root(&odd), Template::File);
    }

    #[test]
    fn test_empty_file_module() {
        let text = pythonize_str("<Source/>", &plain()).unwrap();
        let translated = format!("# Translated with qsapy {}", crate::VERSION);
        let expected: Vec<&str> = vec![
            "# -*- coding: utf-8 -*-",
            &translated,
            "from typing import TYPE_CHECKING, Any",
            "from pineboolib.qsa import qsa",
            "",
            "# /** @file */",
            "",
            "",
            "# /** @class_declaration FormInternalObj */",
            "class FormInternalObj(qsa.FormDBWidget):",
            "",
            "    # /** @class_definition FormInternalObj */",
            "    def _class_init(self):",
            "        pass",
            "",
            "",
            "",
            "if TYPE_CHECKING:",
            "    form: FormInternalObj = FormInternalObj()",
            "    iface = form.iface",
            "else:",
            "    form = None",
        ];
        assert_eq!(text, expected.join("\n") + "\n");
    }

    #[test]
    fn test_permissive_header() {
        let options = TranspileOptions {
            strict: false,
            runtime_module: "rt".into(),
            ..plain()
        };
        let text = pythonize_str("<Source/>", &options).unwrap();
        assert!(text.contains("from rt.qsa import *  # noqa: F403\nfrom rt import qsa\n"));
    }

    #[test]
    fn test_only_used_refs_are_imported() {
        let mut options = plain();
        options
            .import_refs
            .insert("flfactppal".into(), ("project.flfactppal".into(), "FormInternalObj".into()));
        options
            .import_refs
            .insert("unused".into(), ("project.unused".into(), "FormInternalObj".into()));
        let text = pythonize_str(
            r#"<Source><InstructionCall><Identifier name="flfactppal"/></InstructionCall></Source>"#,
            &options,
        )
        .unwrap();
        assert!(text.contains("from project.flfactppal import FormInternalObj as flfactppal\n"));
        assert!(!text.contains("project.unused"));
    }

    #[test]
    fn test_expression_template() {
        let text = pythonize_str(
            r#"<Source parser-template="expression_template"><InstructionFlow type="RETURN"><Constant type="Number" value="1"/></InstructionFlow></Source>"#,
            &plain(),
        )
        .unwrap();
        assert_eq!(text, "return 1\n");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(pythonize_str("<Source>", &plain()).is_err());
    }

    #[test]
    fn test_destination_for() {
        assert_eq!(
            destination_for(Path::new("a/b/mod.qs.xml"), None),
            PathBuf::from("a/b/mod.qs.xml.py")
        );
        assert_eq!(
            destination_for(Path::new("a/b/mod.qs.xml"), Some(Path::new("out"))),
            PathBuf::from("out/mod.qs.xml.py")
        );
    }

    #[test]
    fn test_pythonize_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("mod.xml");
        std::fs::write(&src, "<Source/>").unwrap();
        let dst = destination_for(&src, None);
        pythonize(&src, &dst, &plain()).unwrap();
        assert!(std::fs::read_to_string(dst).unwrap().contains("class FormInternalObj"));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = pythonize(&dir.path().join("nope.xml"), &dir.path().join("out.py"), &plain())
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::CannotReadInput);
    }
}
