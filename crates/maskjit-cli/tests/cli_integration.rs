//! Integration tests for the maskjit binary

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn maskjit(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_maskjit"))
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("MASKJIT_LOG")
        .args(args)
        .output()
        .expect("failed to run maskjit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_op_masked_plus_float() {
    let dir = TempDir::new().unwrap();
    let output = maskjit(dir.path(), &["op", "+", "Masked(int32)", "float64"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        "+ (Masked(int32), float64) -> Masked(float64)"
    );
}

#[test]
fn test_op_without_overload_fails() {
    let dir = TempDir::new().unwrap();
    let output = maskjit(dir.path(), &["op", "+", "Masked(int32)", "Masked(owned_string)"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No applicable overload of `+`"));
}

#[test]
fn test_unify_with_na() {
    let dir = TempDir::new().unwrap();
    let output = maskjit(dir.path(), &["unify", "NA", "int64"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("type: Masked(int64)"));
    assert!(text.contains("left: NA (null-to-masked)"));
    assert!(text.contains("right: int64 (wrap-valid)"));
}

#[test]
fn test_method_lists_binding() {
    let dir = TempDir::new().unwrap();
    let output = maskjit(
        dir.path(),
        &["method", "Masked(owned_string)", "startswith", "Masked(owned_string)"],
    );
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("-> bool"));
    assert!(text.contains("bool startswith(const owned_string*, const owned_string*)"));
}

#[test]
fn test_pack() {
    let dir = TempDir::new().unwrap();
    let output = maskjit(dir.path(), &["pack", "uint16"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Masked(uint16)");

    let output = maskjit(dir.path(), &["pack", "NA"]);
    assert!(!output.status.success());
}

#[test]
fn test_bindings_lists_every_routine() {
    let dir = TempDir::new().unwrap();
    let output = maskjit(dir.path(), &["bindings"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for name in ["length", "startswith", "endswith", "find", "rfind", "upper", "lower"] {
        assert!(text.contains(name), "missing {}", name);
    }
    assert!(text.contains("materialize_from_view"));
}

#[test]
fn test_config_file_is_honored() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("maskjit.toml"), "string_udfs = false\n").unwrap();

    let output = maskjit(dir.path(), &["config"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("string_udfs = false"));

    let output = maskjit(dir.path(), &["method", "Masked(owned_string)", "upper"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("is disabled"));
}
