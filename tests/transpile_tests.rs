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


//! End-to-end transpilation tests.

use pretty_assertions::assert_eq;
use qsapy::{pythonize_str, transpile, ErrorCode, TranspileOptions};
use test_case::test_case;

fn plain() -> TranspileOptions {
    TranspileOptions {
        format: false,
        ..TranspileOptions::default()
    }
}

/// Transpile `body` with the expression template (no module wrapping).
fn snippet(body: &str) -> String {
    let xml = format!(r#"<Source parser-template="expression_template">{}</Source>"#, body);
    pythonize_str(&xml, &plain()).unwrap()
}

#[test]
fn test_declarations_get_forced_values() {
    let py = snippet(
        r#"<DeclarationBlock mode="VAR">
            <Variable name="a"/>
            <Variable name="b" type="String"/>
            <Variable name="c" type="Number"/>
        </DeclarationBlock>"#,
    );
    assert_eq!(py, "a : Any = None\nb = \"\"\nc = 0\n");
}

#[test]
fn test_return_constant() {
    assert_eq!(
        snippet(r#"<InstructionFlow type="RETURN"><Constant type="Number" value="42"/></InstructionFlow>"#),
        "return 42\n"
    );
}

#[test]
fn test_bare_return_is_stripped() {
    assert_eq!(snippet(r#"<InstructionFlow type="RETURN"/>"#), "return\n");
}

#[test_case("true", "True" ; "true literal")]
#[test_case("false", "False" ; "false literal")]
#[test_case("null", "None" ; "null literal")]
#[test_case("this", "self" ; "this")]
fn test_literal_identifiers(name: &str, expected: &str) {
    let py = snippet(&format!(
        r#"<InstructionFlow type="RETURN"><Identifier name="{}"/></InstructionFlow>"#,
        name
    ));
    assert_eq!(py, format!("return {}\n", expected));
}

#[test]
fn test_unresolved_name_strict_and_permissive() {
    let body = r#"<InstructionFlow type="RETURN"><Identifier name="foo"/></InstructionFlow>"#;
    assert_eq!(snippet(body), "return __undef__foo\n");

    let xml = format!(r#"<Source parser-template="expression_template">{}</Source>"#, body);
    let options = TranspileOptions {
        strict: false,
        ..plain()
    };
    assert_eq!(pythonize_str(&xml, &options).unwrap(), "return foo\n");
}

#[test]
fn test_form_reference_goes_through_project() {
    let py = snippet(
        r#"<InstructionFlow type="RETURN"><Identifier name="formRecordclientes"/></InstructionFlow>"#,
    );
    assert_eq!(py, "return qsa.from_project(\"formRecordclientes\")\n");
}

#[test]
fn test_member_rewrite_in_statement() {
    let py = snippet(
        r#"<InstructionFlow type="RETURN"><Member><Identifier name="this"/><Identifier name="foo"/>
            <FunctionCall name="mid"><CallArguments><Constant type="Number" value="2"/><Constant type="Number" value="3"/></CallArguments></FunctionCall>
        </Member></InstructionFlow>"#,
    );
    assert_eq!(py, "return self.foo[2:2 + 3]\n");
}

#[test]
fn test_static_class_call() {
    let py = snippet(
        r#"<InstructionCall><Member><Identifier name="File"/><FunctionCall name="exists"><CallArguments><Constant type="String" value="/tmp"/></CallArguments></FunctionCall></Member></InstructionCall>"#,
    );
    assert_eq!(py, "qsa.FileStatic.exists(\"/tmp\")\n");
}

#[test]
fn test_instruction_update_then_use() {
    let py = snippet(
        r#"<InstructionUpdate><Identifier name="total"/><OpUpdate type="EQUALS"/><Constant type="Number" value="0"/></InstructionUpdate>
        <InstructionFlow type="RETURN"><Identifier name="total"/></InstructionFlow>"#,
    );
    assert_eq!(py, "total = 0\nreturn total\n");
}

#[test]
fn test_unknown_tag_is_reported_inline() {
    let py = snippet(r#"<Frobnicate/><InstructionFlow type="RETURN"/>"#);
    assert_eq!(py, "# DEBUG:: * not-known-seq * <Frobnicate />\nreturn\n");
}

#[test]
fn test_file_template_wraps_module() {
    let py = transpile(
        r#"<Source>
            <DeclarationBlock mode="VAR"><Variable name="form"><Value><Identifier name="this"/></Value></Variable></DeclarationBlock>
            <Function name="init"><Source><InstructionFlow type="RETURN"><Constant type="Number" value="1"/></InstructionFlow></Source></Function>
        </Source>"#,
    )
    .unwrap();

    assert!(py.starts_with("# -*- coding: utf-8 -*-\n"));
    assert!(py.contains("class FormInternalObj(qsa.FormDBWidget):\n"));
    assert!(py.contains("    form : qsa.FormDBWidget\n"));
    assert!(py.contains("    def _class_init(self):\n        self.form = self\n"));
    assert!(py.contains("    def init(self):\n        return 1\n"));
    assert!(py.ends_with("else:\n    form = None\n"));
}

#[test]
fn test_classes_stay_at_module_level() {
    let py = transpile(
        r#"<Source>
            <Class name="interna"><Source/></Class>
            <Class name="oficial" extends="interna"><Source/></Class>
        </Source>"#,
    )
    .unwrap();

    assert!(py.contains("# /** @class_declaration interna */\nclass interna(object):\n"));
    assert!(py.contains("# /** @class_declaration oficial */\nclass oficial(interna):\n"));
    let interna = py.find("class interna").unwrap();
    let module = py.find("class FormInternalObj").unwrap();
    assert!(interna < module);
}

#[test]
fn test_runtime_module_is_configurable() {
    let options = TranspileOptions {
        runtime_module: "myruntime".into(),
        ..plain()
    };
    let py = pythonize_str("<Source/>", &options).unwrap();
    assert!(py.contains("from myruntime import qsa\n"));
    assert!(!py.contains("pineboolib"));
}

#[test]
fn test_malformed_input_is_reported() {
    let err = transpile("<Source><If></Source>").unwrap_err();
    assert_eq!(err.code, ErrorCode::MismatchedClosingTag);

    let err = transpile("<Source>").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnclosedElement);
}

#[test]
fn test_formatting_falls_back_without_black() {
    // With or without black installed the module must still come out.
    let options = TranspileOptions::default();
    let py = pythonize_str("<Source/>", &options).unwrap();
    assert!(py.contains("FormInternalObj"));
}
