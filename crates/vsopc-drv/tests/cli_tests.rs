//! End-to-end driver tests covering the CLI surface and the
//! acceptance scenarios: dump modes, inheritance LUB, short-circuit,
//! override mismatch, inheritance cycles, and unterminated strings.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn vsopc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_vsopc"))
}

#[test]
fn help_mentions_usage() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_reports_something() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("vsopc"));
}

#[test]
fn rejects_the_wrong_extension() {
    let temp = TempDir::new().unwrap();
    let bad = temp.path().join("hello.txt");
    std::fs::copy(fixtures_dir().join("hello.vsop"), &bad).unwrap();

    let mut cmd = Command::new(vsopc_bin());
    cmd.arg(&bad);
    cmd.assert().failure().code(1);
}

#[test]
fn dash_lex_dumps_tokens() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-lex").arg(fixtures_dir().join("hello.vsop"));
    cmd.assert().success().stdout(predicate::str::contains("class"));
}

#[test]
fn dash_parse_dumps_bracket_notation() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-parse").arg(fixtures_dir().join("hello.vsop"));
    cmd.assert().success().stdout(predicate::str::contains("Class(Main"));
}

#[test]
fn dash_check_succeeds_on_hello() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-check").arg(fixtures_dir().join("hello.vsop"));
    cmd.assert().success().stdout(predicate::str::contains(": int32").or(predicate::str::contains(": Main")));
}

#[test]
fn dash_llvm_emits_ir_with_runtime_declarations_first() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-llvm").arg(fixtures_dir().join("hello.vsop"));
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();
    let malloc_pos = text.find("@malloc").or_else(|| text.find("malloc")).expect("malloc declared");
    let main_pos = text.find("define").expect("a function is defined");
    assert!(malloc_pos < main_pos, "runtime declarations must precede the program's own functions");
}

#[test]
fn inheritance_lub_type_checks() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-check").arg(fixtures_dir().join("lub.vsop"));
    cmd.assert().success();
}

#[test]
fn short_circuit_skips_the_right_hand_side() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-llvm").arg(fixtures_dir().join("short_circuit.vsop"));
    cmd.assert().success();
}

#[test]
fn override_mismatch_is_a_semantic_error() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-check").arg(fixtures_dir().join("override_mismatch.vsop"));
    cmd.assert().failure().code(1).stderr(predicate::str::contains("semantic error"));
}

#[test]
fn inheritance_cycle_is_a_semantic_error() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-check").arg(fixtures_dir().join("cycle.vsop"));
    cmd.assert().failure().code(1).stderr(predicate::str::contains("cannot extend in a cycle"));
}

#[test]
fn unterminated_string_is_a_lexical_error() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-lex").arg(fixtures_dir().join("unterminated_string.vsop"));
    cmd.assert().failure().code(1).stderr(predicate::str::contains("string non terminated before end of file"));
}

#[test]
fn verbose_mode_logs_to_stderr_without_breaking_output() {
    let mut cmd = Command::new(vsopc_bin());
    cmd.arg("-check").arg("--verbose").arg(fixtures_dir().join("hello.vsop"));
    cmd.assert().success();
}
