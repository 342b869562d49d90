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


//! End-to-end CLI integration tests.

use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qsapy"));
    cmd.env_remove("QSAPY_LOG").env_remove("RUST_LOG");
    cmd
}

/// Test --help flag.
#[test]
fn test_help_flag() {
    let output = cargo_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("qsapy"));
    assert!(stdout.contains("--path"));
    assert!(stdout.contains("--trace-file"));
    assert!(stdout.contains("--jobs"));
}

/// Test --version flag.
#[test]
fn test_version_flag() {
    let output = cargo_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("qsapy"));
    assert!(stdout.contains(qsapy::VERSION));
}

/// Files are required.
#[test]
fn test_no_files_is_usage_error() {
    let output = cargo_bin().output().expect("Failed to execute command");
    assert!(!output.status.success());
}

/// Convert one file next to itself.
#[test]
fn test_convert_next_to_source() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("flfactppal.qs.xml");
    std::fs::write(
        &src,
        r#"<Source><Function name="init"><Source><InstructionFlow type="RETURN"/></Source></Function></Source>"#,
    )
    .unwrap();

    let output = cargo_bin()
        .arg(&src)
        .arg("--no-format")
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "Conversion failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let py = std::fs::read_to_string(dir.path().join("flfactppal.qs.xml.py")).unwrap();
    assert!(py.contains("class FormInternalObj(qsa.FormDBWidget):"));
    assert!(py.contains("    def init(self):"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Converting"));
}

/// Convert into an output directory, quietly.
#[test]
fn test_convert_into_directory_quiet() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let src = dir.path().join("m.xml");
    std::fs::write(&src, "<Source/>").unwrap();

    let output = cargo_bin()
        .arg(&src)
        .arg("--path")
        .arg(out.path())
        .arg("--quiet")
        .arg("--no-format")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(out.path().join("m.xml.py").exists());
    assert!(!dir.path().join("m.xml.py").exists());
    assert!(output.stdout.is_empty());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Converting"));
}

/// A missing output directory is rejected before converting.
#[test]
fn test_missing_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("m.xml");
    std::fs::write(&src, "<Source/>").unwrap();

    let output = cargo_bin()
        .arg(&src)
        .arg("--path")
        .arg(dir.path().join("nope"))
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

/// Failed files give a non-zero exit code, the others are still written.
#[test]
fn test_partial_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.xml");
    let bad = dir.path().join("bad.xml");
    std::fs::write(&good, "<Source/>").unwrap();
    std::fs::write(&bad, "<Source><If></Source>").unwrap();

    let output = cargo_bin()
        .arg(&good)
        .arg(&bad)
        .arg("--no-format")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(dir.path().join("good.xml.py").exists());
    assert!(!dir.path().join("bad.xml.py").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Conversion failed for some files"));
}

/// Permissive mode passes unresolved names through.
#[test]
fn test_permissive_flag() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("m.xml");
    std::fs::write(
        &src,
        r#"<Source><Function name="f"><Source><InstructionFlow type="RETURN"><Identifier name="foo"/></InstructionFlow></Source></Function></Source>"#,
    )
    .unwrap();

    let output = cargo_bin()
        .arg(&src)
        .arg("--permissive")
        .arg("--no-format")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let py = std::fs::read_to_string(dir.path().join("m.xml.py")).unwrap();
    assert!(py.contains("        return foo\n"));
    assert!(py.contains("import *  # noqa: F403"));
}

/// The trace file records handler activity.
#[test]
fn test_trace_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("m.xml");
    let trace = dir.path().join("m.trace");
    std::fs::write(&src, "<Source/>").unwrap();

    let output = cargo_bin()
        .arg(&src)
        .arg("--trace-file")
        .arg(&trace)
        .arg("--no-format")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let text = std::fs::read_to_string(&trace).unwrap();
    assert!(text.starts_with("0001 Source: begin-gen"));
}

/// --optdebug prints the parsed options.
#[test]
fn test_optdebug() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("m.xml");
    std::fs::write(&src, "<Source/>").unwrap();

    let output = cargo_bin()
        .arg(&src)
        .arg("--optdebug")
        .arg("--no-format")
        .arg("--jobs")
        .arg("1")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no_format: true"));
    assert!(stdout.contains("jobs: Some("));
}
