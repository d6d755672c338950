//! Tests for error messages, suggestions and exit codes.

mod common;

use common::Sandbox;
use predicates::prelude::*;

#[test]
fn test_no_arguments_is_usage_error() {
    Sandbox::new().cmd().assert().code(2);
}

#[test]
fn test_malformed_set_is_rejected() {
    Sandbox::new()
        .cmd()
        .args(["new", "x.txt", "-t", "a", "--set", "novalue"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_unknown_template_lists_available() {
    let sandbox = Sandbox::new();
    sandbox.template("readme.md", "").template("license", "");

    sandbox
        .cmd()
        .args(["new", "x.md", "-t", "nope"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Template not found: nope"))
        .stderr(predicate::str::contains("readme.md"))
        .stderr(predicate::str::contains("license"));
}

#[test]
fn test_empty_catalog_points_at_init() {
    Sandbox::new()
        .cmd()
        .args(["new", "x.md", "-t", "readme.md"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No templates found"))
        .stderr(predicate::str::contains("stencil init"));
}

#[test]
fn test_existing_target_needs_force() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "new").write("out.txt", "old");

    sandbox
        .cmd()
        .args(["new", "out.txt", "-t", "a.txt", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));
    assert_eq!(sandbox.read("out.txt"), "old");
}

#[test]
fn test_missing_template_flag_without_input() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "");

    sandbox
        .cmd()
        .args(["new", "out.txt", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--template"));
}

#[test]
fn test_unanswered_question_writes_nothing() {
    let sandbox = Sandbox::new();
    sandbox.template("c.txt", r#"{{confirm "doTests" "Add tests?"}}body"#);

    sandbox
        .cmd()
        .args(["new", "out.txt", "-t", "c.txt", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("doTests"));
    assert!(!sandbox.path("out.txt").exists());
}

#[test]
fn test_invalid_answer_is_reported() {
    let sandbox = Sandbox::new();
    sandbox.template("s.txt", r#"{{select "lang" "Language?" "rs" "ts"}}{{lang}}"#);

    sandbox
        .cmd()
        .args(["new", "out.txt", "-t", "s.txt", "--set", "lang=go"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lang"));
    assert!(!sandbox.path("out.txt").exists());
}

#[test]
fn test_broken_template_fails_to_compile() {
    let sandbox = Sandbox::new();
    sandbox.template("bad.txt", "{{#if x}}never closed");

    sandbox
        .cmd()
        .args(["new", "out.txt", "-t", "bad.txt", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to compile"));
    assert!(!sandbox.path("out.txt").exists());
}

#[test]
fn test_unknown_config_key() {
    Sandbox::new()
        .cmd()
        .args(["config", "get", "does.not.exist"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_missing_config_file() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--config"])
        .arg(sandbox.path("missing.toml"))
        .arg("list")
        .assert()
        .code(4);
}

#[test]
fn test_invalid_workspace_config() {
    let sandbox = Sandbox::new();
    sandbox.write(".stencil/config.toml", "[catalog]\nmode = \"sideways\"\n");

    sandbox.cmd().arg("list").assert().code(4);
}

#[test]
fn test_template_create_refuses_duplicates() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "keep");

    sandbox
        .cmd()
        .args(["template", "create", "a.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(sandbox.read(".stencil/templates/a.txt.hbs"), "keep");
}
