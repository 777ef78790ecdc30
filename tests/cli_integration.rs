//! CLI integration tests for catalyst.
//!
//! Only subcommands that work without a package manager are exercised here.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the catalyst binary command.
fn catalyst() -> Command {
    Command::cargo_bin("catalyst").unwrap()
}

/// A small C project: a curl client with a vendored JSON parser.
fn sample_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write(
        root,
        "main.c",
        "#include <stdio.h>\n\
         #include <curl/curl.h>\n\
         #include \"cJSON.h\"\n\
         \n\
         int main(void) {\n    return 0;\n}\n",
    );
    write(
        root,
        "vendor/cjson/cJSON.c",
        "#include \"cJSON.h\"\n\nint cjson_init(void) {\n    return 0;\n}\n",
    );
    write(
        root,
        "vendor/cjson/cJSON.h",
        "#ifndef CJSON_H\n#define CJSON_H\nint cjson_init(void);\n#endif\n",
    );

    tmp
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// ============================================================================
// catalyst scan
// ============================================================================

#[test]
fn test_scan_lists_dependencies() {
    let tmp = sample_project();

    catalyst()
        .arg("scan")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("- curl"))
        .stdout(predicate::str::contains("- stdio"))
        .stdout(predicate::str::contains("- cJSON"));
}

#[test]
fn test_scan_json() {
    let tmp = sample_project();

    let output = catalyst()
        .arg("scan")
        .arg(tmp.path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let deps: Vec<&str> = json["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    assert!(deps.contains(&"curl"));
    assert!(deps.contains(&"stdio"));
}

#[test]
fn test_scan_missing_directory() {
    let tmp = TempDir::new().unwrap();

    catalyst()
        .arg("scan")
        .arg(tmp.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ============================================================================
// catalyst symbols
// ============================================================================

#[test]
fn test_symbols_without_compiler() {
    let tmp = sample_project();

    catalyst()
        .arg("symbols")
        .arg(tmp.path())
        .env_remove("CC")
        .env("PATH", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("No undefined symbols found"));
}

// ============================================================================
// catalyst translate
// ============================================================================

#[test]
fn test_translate_known_library() {
    let tmp = TempDir::new().unwrap();

    catalyst()
        .args(["translate", "curl", "--pm", "apt"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("libcurl4-openssl-dev\n");
}

#[test]
fn test_translate_standard_header() {
    let tmp = TempDir::new().unwrap();

    catalyst()
        .args(["translate", "stdio", "--pm", "brew"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("standard library"));
}

#[test]
fn test_translate_unsupported_package_manager() {
    let tmp = TempDir::new().unwrap();

    catalyst()
        .args(["translate", "curl", "--pm", "emerge"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("`emerge` is not a supported package manager"))
        .stderr(predicate::str::contains("supported: apt, dnf"));
}

#[test]
fn test_translate_unknown_without_search() {
    let tmp = TempDir::new().unwrap();

    catalyst()
        .args(["translate", "myutils", "--pm", "apt"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no apt package known for `myutils`"));
}

#[test]
fn test_translate_uses_project_overrides() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        ".catalyst/config.toml",
        "[packages.myutils]\napt = \"libmyutils-dev\"\n",
    );

    catalyst()
        .args(["translate", "myutils", "--pm", "apt"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("libmyutils-dev\n");
}

// ============================================================================
// catalyst analyze
// ============================================================================

#[test]
fn test_analyze_reports_targets_and_libraries() {
    let tmp = sample_project();

    catalyst()
        .arg("analyze")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Target main:"))
        .stdout(predicate::str::contains("vendored: cjson"))
        .stdout(predicate::str::contains("-lcurl"));

    assert!(!tmp.path().join("catalyst.yml").exists());
}

#[test]
fn test_analyze_write_creates_document() {
    let tmp = sample_project();

    catalyst()
        .arg("analyze")
        .arg(tmp.path())
        .arg("--write")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let document = fs::read_to_string(tmp.path().join("catalyst.yml")).unwrap();
    assert!(document.contains("libcurl4-openssl-dev"));
    assert!(document.contains("vendor/cjson/cJSON.c"));
}

#[test]
fn test_analyze_target_requires_write() {
    let tmp = sample_project();

    catalyst()
        .arg("analyze")
        .arg(tmp.path())
        .args(["--target", "main"])
        .assert()
        .failure();
}

// ============================================================================
// catalyst install
// ============================================================================

#[test]
fn test_install_without_document() {
    let tmp = TempDir::new().unwrap();

    catalyst()
        .arg("install")
        .arg("--config")
        .arg(tmp.path().join("catalyst.yml"))
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalyst analyze --write"));
}

// ============================================================================
// catalyst completions
// ============================================================================

#[test]
fn test_completions_bash() {
    catalyst()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("catalyst"));
}
