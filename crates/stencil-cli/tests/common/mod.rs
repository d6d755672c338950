//! Shared fixtures for CLI tests.
//!
//! Every command runs in a throwaway workspace with its own config home so
//! the user's global configuration never leaks in.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub struct Sandbox {
    workspace: TempDir,
    config_home: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            workspace: TempDir::new().unwrap(),
            config_home: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.workspace.path()
    }

    /// Directory standing in for the user's config home.
    pub fn config_home(&self) -> &Path {
        self.config_home.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.workspace.path().join(relative)
    }

    /// Write a file below the workspace, creating parents.
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    /// Add `<name>.hbs` to the catalog directory.
    pub fn template(&self, name: &str, code: &str) -> &Self {
        self.write(&format!(".stencil/templates/{name}.hbs"), code)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// `stencil` running in the workspace with stdin closed.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("stencil");
        cmd.current_dir(self.root())
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .write_stdin("");
        cmd
    }
}
