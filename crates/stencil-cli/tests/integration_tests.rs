//! End-to-end tests for the `stencil` binary.

mod common;

use common::Sandbox;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_help_flag() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stencil"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn test_version_flag() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_new_command_help() {
    Sandbox::new()
        .cmd()
        .args(["new", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--template"))
        .stdout(predicate::str::contains("--set"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_init_creates_config_and_sample() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration created"));

    assert!(sandbox.path(".stencil/config.toml").is_file());
    assert!(sandbox.path(".stencil/templates/example.md.hbs").is_file());

    // A second run keeps what is there.
    sandbox.write(".stencil/config.toml", "# mine\n");
    sandbox
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    assert_eq!(sandbox.read(".stencil/config.toml"), "# mine\n");
}

#[test]
#[cfg(target_os = "linux")]
fn test_init_global_writes_to_config_home() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["init", "--global"]).assert().success();

    assert!(sandbox.config_home().join("stencil/config.toml").is_file());
    assert!(!sandbox.path(".stencil").exists());
}

#[test]
fn test_sample_template_renders_with_answers() {
    let sandbox = Sandbox::new();
    sandbox.cmd().arg("init").assert().success();

    sandbox
        .cmd()
        .args([
            "new",
            "docs/NOTES.md",
            "-t",
            "example.md",
            "--yes",
            "--set",
            "title=Release notes",
            "--set",
            "withToc=yes",
            "--set",
            "status=review",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created docs/NOTES.md"));

    let notes = sandbox.read("docs/NOTES.md");
    assert!(notes.contains("# Release notes"), "{notes}");
    assert!(notes.contains("## Contents"), "{notes}");
    assert!(notes.contains("Status: review"), "{notes}");
    assert!(notes.contains("in `docs`"), "{notes}");
}

#[test]
fn test_prompt_default_is_used_without_input() {
    let sandbox = Sandbox::new();
    sandbox.template(
        "greeting.txt",
        r#"{{prompt "who" "Who?" default="world"}}Hello, {{who}}!"#,
    );

    sandbox
        .cmd()
        .args(["new", "hello.txt", "-t", "greeting.txt", "--yes"])
        .assert()
        .success();

    assert_eq!(sandbox.read("hello.txt"), "Hello, world!");
}

#[test]
fn test_builtins_and_config_variables() {
    let sandbox = Sandbox::new();
    sandbox
        .write(
            ".stencil/config.toml",
            "[variables]\nauthor = \"ada\"\n",
        )
        .template("header.rs", "// {{author}}: {{fileName}} ({{name}}) in {{dirName}}");

    sandbox
        .cmd()
        .args(["new", "src/lib.rs", "--template", "header.rs"])
        .assert()
        .success();

    assert_eq!(sandbox.read("src/lib.rs"), "// ada: lib.rs (lib) in src");
}

#[test]
fn test_template_found_by_file_name() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "A");

    sandbox
        .cmd()
        .args(["new", "out.txt", "-t", "a.txt.hbs"])
        .assert()
        .success();
    assert_eq!(sandbox.read("out.txt"), "A");
}

#[test]
fn test_dry_run_prints_without_writing() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "content for {{fileName}}");

    sandbox
        .cmd()
        .args(["new", "out.txt", "-t", "a.txt", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("content for out.txt"));

    assert!(!sandbox.path("out.txt").exists());
}

#[test]
fn test_force_overwrites_target() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "new").write("out.txt", "old");

    sandbox
        .cmd()
        .args(["new", "out.txt", "-t", "a.txt", "--force"])
        .assert()
        .success();
    assert_eq!(sandbox.read("out.txt"), "new");
}

#[test]
fn test_list_formats() {
    let sandbox = Sandbox::new();
    sandbox.template("b.md", "").template("a.txt", "");

    sandbox
        .cmd()
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout("a.txt\nb.md\n");

    let out = sandbox
        .cmd()
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let rows: Value = serde_json::from_slice(&out.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "a.txt");
    assert_eq!(rows[0]["label"], "a.txt.hbs");
    assert!(rows[0]["path"].as_str().unwrap().ends_with("a.txt.hbs"));
}

#[test]
fn test_list_tree_shows_workspace_and_templates() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "");
    let name = sandbox.root().file_name().unwrap().to_string_lossy().into_owned();

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(name))
        .stdout(predicate::str::contains("└── a.txt.hbs a.txt"));
}

#[test]
fn test_global_json_output_forces_json_listing() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "");

    let out = sandbox
        .cmd()
        .args(["--output-format", "json", "list"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let rows: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(rows[0]["name"], "a.txt");
}

#[test]
fn test_several_workspaces() {
    let sandbox = Sandbox::new();
    sandbox
        .write("app/.stencil/templates/one.hbs", "")
        .write("lib/.stencil/templates/two.hbs", "");

    let out = sandbox
        .cmd()
        .args(["-w", "app", "-w", "lib", "list", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let rows: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(rows[0]["workspace"], "app");
    assert_eq!(rows[0]["name"], "one");
    assert_eq!(rows[1]["workspace"], "lib");
    assert_eq!(rows[1]["name"], "two");
}

#[test]
fn test_workspace_mode_skips_excluded_dirs() {
    let sandbox = Sandbox::new();
    sandbox
        .write("src/mod.rs.hbs", "")
        .write("node_modules/pkg/skip.hbs", "")
        .write("notes.txt", "");

    sandbox
        .cmd()
        .env("STENCIL_CATALOG__MODE", "workspace")
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout("mod.rs\n");
}

#[test]
fn test_config_get_and_env_override() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "get", "catalog.extension"])
        .assert()
        .success()
        .stdout("hbs\n");

    sandbox
        .cmd()
        .env("STENCIL_CATALOG__EXTENSION", "tpl")
        .args(["config", "get", "catalog.extension"])
        .assert()
        .success()
        .stdout("tpl\n");
}

#[test]
fn test_config_path_lists_both_files() {
    Sandbox::new()
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("global:"))
        .stdout(predicate::str::contains(".stencil/config.toml"));
}

#[test]
fn test_template_lifecycle() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["template", "create", "widget.tsx", "--content", "export {}"])
        .assert()
        .success();
    assert_eq!(
        sandbox.read(".stencil/templates/widget.tsx.hbs"),
        "export {}"
    );

    sandbox
        .cmd()
        .args(["template", "show", "widget.tsx"])
        .assert()
        .success()
        .stdout("export {}\n");

    sandbox
        .cmd()
        .args(["template", "rename", "widget.tsx", "button.tsx"])
        .assert()
        .success();
    assert!(sandbox.path(".stencil/templates/button.tsx.hbs").is_file());
    assert!(!sandbox.path(".stencil/templates/widget.tsx.hbs").exists());

    sandbox
        .cmd()
        .args(["t", "delete", "button.tsx"])
        .assert()
        .success();
    assert!(!sandbox.path(".stencil/templates/button.tsx.hbs").exists());
}

#[test]
fn test_completions() {
    Sandbox::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stencil"));
}

#[test]
fn test_quiet_mode() {
    let sandbox = Sandbox::new();
    sandbox.template("a.txt", "A");

    sandbox
        .cmd()
        .args(["--quiet", "new", "out.txt", "-t", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(sandbox.read("out.txt"), "A");
}
