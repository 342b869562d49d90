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


//! Control flow rewrites, checked on rendered Python.

use pretty_assertions::assert_eq;
use qsapy::{pythonize_str, TranspileOptions};

fn snippet(body: &str) -> String {
    let xml = format!(r#"<Source parser-template="expression_template">{}</Source>"#, body);
    let options = TranspileOptions {
        format: false,
        ..TranspileOptions::default()
    };
    pythonize_str(&xml, &options).unwrap()
}

/// Rendered lines without the paragraph separators.
fn code_lines(py: &str) -> Vec<&str> {
    py.lines().filter(|l| !l.trim().is_empty()).collect()
}

#[test]
fn test_for_loop_keeps_c_semantics() {
    let py = snippet(
        r#"<For>
            <ForInitialize><Variable name="i"><Value><Constant type="Number" value="0"/></Value></Variable></ForInitialize>
            <ForCompare><Identifier name="i"/><Compare type="LT"/><Constant type="Number" value="3"/></ForCompare>
            <ForIncrement><InlineUpdate type="PLUSPLUS" mode="read-update"><Identifier name="i"/></InlineUpdate></ForIncrement>
            <Source><InstructionCall><FunctionCall name="debug"><CallArguments><Identifier name="i"/></CallArguments></FunctionCall></InstructionCall></Source>
        </For>"#,
    );
    assert_eq!(
        code_lines(&py),
        vec![
            "i = 0",
            "s01_while_pass = True",
            "while i < 3:",
            "    if not s01_while_pass:",
            "        i += 1",
            "        s01_while_pass = True",
            "        continue",
            "    s01_while_pass = False",
            "    qsa.debug(i)",
            "    i += 1",
            "    s01_while_pass = True",
            "    try:",
            "        i < 3",
            "    except Exception:",
            "        break",
        ]
    );
}

#[test]
fn test_for_loops_get_distinct_guards() {
    let one = r#"<For><ForCompare><Identifier name="false"/></ForCompare><Source/></For>"#;
    let py = snippet(&format!("{}{}", one, one));
    assert!(py.contains("s01_while_pass = True\nwhile False:\n"));
    assert!(py.contains("s02_while_pass = True\nwhile False:\n"));
}

#[test]
fn test_for_without_compare_loops_forever() {
    let py = snippet(r#"<For><Source/></For>"#);
    assert!(py.contains("while True:\n"));
}

#[test]
fn test_do_while_body_runs_once_first() {
    let py = snippet(
        r#"<DoWhile><Source><InstructionFlow type="CONTINUE"/></Source><Condition><Identifier name="false"/></Condition></DoWhile>"#,
    );
    assert_eq!(
        code_lines(&py),
        vec![
            "s01_dowhile_1stloop = True",
            "while s01_dowhile_1stloop or False:",
            "    s01_dowhile_1stloop = False",
            "    continue",
        ]
    );
}

#[test]
fn test_if_else_branches_share_scope() {
    let py = snippet(
        r#"<If><Condition><Identifier name="true"/></Condition>
            <Source><DeclarationBlock mode="VAR"><Variable name="x"><Value><Constant type="Number" value="1"/></Value></Variable></DeclarationBlock></Source>
            <Else><Source/></Else>
        </If>
        <InstructionCall><FunctionCall name="debug"><CallArguments><Identifier name="x"/></CallArguments></FunctionCall></InstructionCall>"#,
    );
    assert_eq!(
        code_lines(&py),
        vec!["if True:", "    x = 1", "else:", "    pass", "qsa.debug(x)"]
    );
}

#[test]
fn test_function_locals_do_not_leak() {
    let py = snippet(
        r#"<Function name="a"><Source><DeclarationBlock mode="VAR"><Variable name="x"/></DeclarationBlock></Source></Function>
        <Function name="b"><Source><InstructionFlow type="RETURN"><Identifier name="x"/></InstructionFlow></Source></Function>"#,
    );
    assert!(py.contains("    x : Any = None\n"));
    assert!(py.contains("    return __undef__x\n"));
}

#[test]
fn test_parameters_are_visible_in_body_only() {
    let py = snippet(
        r#"<Function name="f"><Arguments><Variable name="dato"/></Arguments><Source>
            <InstructionFlow type="RETURN"><Identifier name="dato"/></InstructionFlow>
        </Source></Function>
        <InstructionFlow type="RETURN"><Identifier name="dato"/></InstructionFlow>"#,
    );
    assert!(py.contains("def f(self, dato=None):\n    return dato\n"));
    assert!(py.contains("\nreturn __undef__dato\n"));
}

#[test]
fn test_switch_uses_case_matcher() {
    let py = snippet(
        r#"<Switch><Condition><Identifier name="v"/></Condition>
            <Case><Value><Constant type="String" delim="'" value="one"/></Value><Source><InstructionFlow type="BREAK"/></Source></Case>
            <CaseDefault><Source/></CaseDefault>
        </Switch>"#,
    );
    assert_eq!(
        code_lines(&py),
        vec![
            "for case in qsa.switch(__undef__v):",
            "    if case('one'):",
            "        break",
            "    if case():",
            "        pass",
        ]
    );
}

#[test]
fn test_old_switch_break_ends_fallthrough() {
    let py = snippet(
        r#"<OldSwitch><Condition><Identifier name="x"/></Condition>
            <Case><Value><Constant type="Number" value="1"/></Value><Source>
                <InstructionFlow type="RETURN"/>
                <InstructionFlow type="BREAK"/>
            </Source></Case>
        </OldSwitch>"#,
    );
    assert!(py.contains("s01_when = __undef__x\n"));
    assert!(py.contains("s01_do_work = False  # BREAK\n"));
    assert!(!py.contains("\n        break\n"));
}

#[test]
fn test_old_switch_break_inside_try_ends_case() {
    let py = snippet(
        r#"<OldSwitch><Condition><Identifier name="x"/></Condition>
            <Case><Value><Constant type="Number" value="1"/></Value><Source>
                <TryCatch><Source><InstructionFlow type="BREAK"/></Source><Source/></TryCatch>
            </Source></Case>
        </OldSwitch>"#,
    );
    let lines: Vec<&str> = code_lines(&py).into_iter().map(str::trim).collect();
    let at = lines.iter().position(|l| *l == "try:").unwrap();
    assert_eq!(lines[at + 1], "s01_do_work = False  # BREAK");
    assert!(!py.lines().any(|l| l.trim() == "break"));
}

#[test]
fn test_try_catch_exposes_message() {
    let py = snippet(
        r#"<TryCatch><Source/><Identifier name="e"/><Source>
            <InstructionFlow type="RETURN"><Identifier name="e"/></InstructionFlow>
        </Source></TryCatch>"#,
    );
    assert_eq!(
        code_lines(&py),
        vec![
            "try:",
            "    pass",
            "except Exception:",
            "    e = qsa.format_exc()",
            "    return e",
        ]
    );
}

#[test]
fn test_with_block_qualifies_calls() {
    let py = snippet(
        r#"<Variable name="cur"/><With><Identifier name="cur"/><Source>
            <InstructionCall><FunctionCall name="select"><CallArguments><Constant type="String" value="1 = 1"/></CallArguments></FunctionCall></InstructionCall>
        </Source></With>"#,
    );
    assert!(py.contains("cur.select(\"1 = 1\")\n"));
}
