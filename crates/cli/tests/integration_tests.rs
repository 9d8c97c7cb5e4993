//! End-to-end tests for the prettyfold CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("prettyfold").unwrap()
}

fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    fs::write(
        temp_dir.path().join("calc.py"),
        "def area(r) -> float:\n    return pi * r ** 2 if r >= 0 else 0\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("app.js"),
        "const label = \">=\";\nconst ok = a <= b;\n",
    )
    .unwrap();

    temp_dir
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shows operators and keywords as glyphs"))
        .stdout(predicate::str::contains("export"));

    cli()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cosmetic token folding"));
}

#[test]
fn test_scan_grouped_json() {
    let project = create_test_project();

    let output = cli().arg(project.path()).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["python"]["stats"]["total_files"], 1);
    assert_eq!(value["python"]["stats"]["total_folds"], 4);
    assert_eq!(value["nodejs"]["stats"]["total_folds"], 1);
    assert_eq!(value["nodejs"]["stats"]["glyphs"]["≤"], 1);
}

#[test]
fn test_scan_summary_flat() {
    let project = create_test_project();

    cli()
        .arg(project.path())
        .args(["--flat", "--format", "summary", "--language", "python"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Folds: 4"))
        .stdout(predicate::str::contains("Python: 1, JavaScript: 0"));
}

#[test]
fn test_render_plain() {
    let project = create_test_project();

    cli()
        .args(["--no-color", "render"])
        .arg(project.path().join("calc.py"))
        .assert()
        .success()
        .stdout(predicate::eq(
            "def area(r) ➔ float:\n    return π * r ^ 2 if r ≥ 0 else 0\n",
        ));
}

#[test]
fn test_render_keeps_string_contents() {
    let project = create_test_project();

    cli()
        .arg("render")
        .arg(project.path().join("app.js"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\">=\""))
        .stdout(predicate::str::contains("a ≤ b"));
}

#[test]
fn test_list_summary() {
    let project = create_test_project();

    cli()
        .args(["list", "--format", "summary"])
        .arg(project.path().join("calc.py"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Folds: 4"))
        .stdout(predicate::str::contains("1. 1:13 -> -> ➔"));
}

#[test]
fn test_list_unsupported_file_fails() {
    let project = create_test_project();
    let readme = project.path().join("README.md");
    fs::write(&readme, "# notes\n").unwrap();

    cli()
        .arg("list")
        .arg(&readme)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file extension"));
}

#[test]
fn test_export_then_import() {
    let project = create_test_project();
    let path = project.path().join("mappings.json");

    cli()
        .args(["export", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported"));

    let json = fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"pluginVersion\""));
    assert!(json.contains("\"from\": \"lambda\""));

    cli()
        .arg("import")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("(built-in set)"))
        .stdout(predicate::str::contains("Arrow: -> ➔"));
}

#[test]
fn test_custom_mappings_file() {
    let project = create_test_project();
    let path = project.path().join("glyphs.json");
    fs::write(
        &path,
        r#"{"mappings": [{"from": "def", "to": "ƒ", "category": "Keyword"}]}"#,
    )
    .unwrap();

    cli()
        .args(["render", "--mappings"])
        .arg(&path)
        .arg(project.path().join("calc.py"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ƒ area(r) -> float:"));
}

#[test]
fn test_project_config_file() {
    let project = create_test_project();
    fs::write(
        project.path().join("prettyfold.toml"),
        "languages = [\"javascript\"]\n",
    )
    .unwrap();

    let output = cli().arg(project.path()).arg("--flat").output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stats"]["total_files"], 1);
    assert_eq!(value["stats"]["javascript_files"], 1);
}

#[test]
fn test_import_rejects_unknown_condition() {
    let project = create_test_project();
    let path = project.path().join("bad.json");
    fs::write(
        &path,
        r#"{"mappings": [{"from": "@", "to": "∘", "condition": "in_decorator"}]}"#,
    )
    .unwrap();

    cli()
        .arg("import")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("in_decorator"));
}
