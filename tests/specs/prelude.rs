//! Shared helpers for CLI specs

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

pub use predicates::prelude::*;
pub use serde_json::{json, Value};
pub use similar_asserts::assert_eq as assert_eq_diff;

/// A throwaway project directory with a `.knoa` root inside it
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> std::path::PathBuf {
        self.dir.path().join(".knoa")
    }

    /// Write a file relative to the project directory
    pub fn file(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read_json(&self, relative: &str) -> Value {
        let content = std::fs::read_to_string(self.dir.path().join(relative)).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    pub fn knoa(&self) -> Cli {
        let mut cmd = Command::cargo_bin("knoa").unwrap();
        cmd.current_dir(self.dir.path()).env_remove("RUST_LOG");
        Cli { cmd }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Run {
        Run {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails_with(mut self, code: i32) -> Run {
        Run {
            assert: self.cmd.assert().failure().code(code),
        }
    }
}

pub struct Run {
    assert: assert_cmd::assert::Assert,
}

impl Run {
    pub fn stdout_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(expected)),
        }
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicate::str::contains(expected)),
        }
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stderr).to_string()
    }

    pub fn stdout_json(&self) -> Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }
}
