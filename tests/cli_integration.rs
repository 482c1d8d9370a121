//! CLI integration tests
//!
//! These tests run the built binary and verify:
//! - Command parsing and generated flags
//! - Output formatting
//! - Generated files
//! - Exit codes

mod support;

use serde_json::{json, Value};
use std::path::Path;
use std::process::{Command, Output};
use support::{lerna_monorepo, standalone_package, TestRepo};

fn thrasher(args: &[&str], current_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_thrasher"))
        .args(args)
        .current_dir(current_dir)
        .env_remove("RUST_LOG")
        .env_remove("THRASHER_OUTPUT_DIR")
        .env_remove("THRASHER_DIST_DIR")
        .env("THRASHER_LOG_LEVEL", "error")
        .output()
        .expect("Failed to execute thrasher")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_cli_help() {
    let repo = TestRepo::new(&[]);
    let output = thrasher(&["--help"], repo.root());

    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("dump"));
    assert!(help.contains("create-tsconfigs"));
    assert!(help.contains("build"));
    assert!(help.contains("--log-level"));
}

#[test]
fn test_cli_version() {
    let repo = TestRepo::new(&[]);
    let output = thrasher(&["--version"], repo.root());

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_subcommand_help_lists_declared_options() {
    let repo = TestRepo::new(&[]);
    let output = thrasher(&["dump", "--help"], repo.root());

    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("--initialDirectory"));
    assert!(help.contains("initial-directory"));
    assert!(help.contains("--format"));
}

#[test]
fn test_missing_command_is_usage_error() {
    let repo = TestRepo::new(&[]);
    let output = thrasher(&[], repo.root());

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let repo = TestRepo::new(&[]);
    let output = thrasher(&["dump", "--no-such-flag"], repo.root());

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_dump_defaults_to_working_directory() {
    let repo = lerna_monorepo();
    let output = thrasher(
        &["dump", "--format", "json"],
        &repo.path("packages/package-one-dir"),
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let dumped: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(dumped["isMonorepo"], json!(true));
    assert_eq!(
        dumped["projectRootDir"],
        json!(repo.root().display().to_string())
    );
    assert_eq!(dumped["packagesToBuild"], json!(["package-one"]));
}

#[test]
fn test_dump_human_output() {
    let repo = standalone_package();
    let root = repo.root().display().to_string();
    let output = thrasher(&["dump", "--initialDirectory", &root], repo.root());

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Standalone Project"));
    assert!(text.contains("my-package 0.1.0"));
}

#[test]
fn test_create_tsconfigs_for_monorepo() {
    let repo = lerna_monorepo();
    repo.write(
        "tsconfig.json",
        r#"{"compilerOptions": {"strict": true, "target": "es2019"}}"#,
    );
    let output = thrasher(&["create-tsconfigs"], repo.root());

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let root = repo.read_json(".thrasher/tsconfig.json");
    assert_eq!(root["extends"], json!("../tsconfig.json"));
    assert_eq!(root["compilerOptions"]["baseUrl"], json!(".."));
    assert_eq!(
        root["compilerOptions"]["paths"]["@scope/package-two"],
        json!(["other-packages-root/package-two-dir/src"])
    );

    let one = repo.read_json("packages/package-one-dir/tsconfig.json");
    assert_eq!(one["extends"], json!("../../.thrasher/tsconfig.json"));
    assert_eq!(
        one["references"],
        json!([{"path": "../../other-packages-root/package-two-dir"}])
    );
    assert_eq!(one["compilerOptions"]["outDir"], json!("./dist/module"));
}

#[test]
fn test_forbidden_tsconfig_option_fails() {
    let repo = lerna_monorepo();
    repo.write("tsconfig.json", r#"{"compilerOptions": {"baseUrl": "."}}"#);
    let output = thrasher(&["build"], repo.root());

    assert_eq!(output.status.code(), Some(1));
    let message = format!(
        "\nThe tsconfig.json option 'baseUrl' cannot be set, because it will be overridden by thrasher (in {})\n\n",
        repo.path("tsconfig.json").display()
    );
    assert!(stderr(&output).contains(&message), "stderr: {}", stderr(&output));
    assert!(!repo.path(".thrasher").exists());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_standalone_from_subdirectory_fails() {
    let repo = standalone_package();
    let output = thrasher(&["dump"], &repo.path("src"));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("A standalone project must be built from its root directory"));
}

#[test]
fn test_build_writes_configs_then_dumps() {
    let repo = lerna_monorepo();
    let output = thrasher(
        &["build", "--initial-directory", "other-packages-root/package-two-dir", "--format", "json"],
        repo.root(),
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(repo.path("other-packages-root/package-two-dir/tsconfig.json").exists());
    assert!(!repo.path("packages/package-one-dir/tsconfig.json").exists());

    let dumped: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(dumped["packagesToBuild"], json!(["@scope/package-two"]));
}

#[test]
fn test_invalid_output_dir_is_rejected() {
    let repo = standalone_package();
    let output = Command::new(env!("CARGO_BIN_EXE_thrasher"))
        .arg("dump")
        .current_dir(repo.root())
        .env("THRASHER_OUTPUT_DIR", "../escape")
        .output()
        .expect("Failed to execute thrasher");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Output directory must be relative"));
}
