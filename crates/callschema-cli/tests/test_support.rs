//! Shared helpers for driving the `callschema` binary

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TOOLS: &str = r#"
aliases:
  Number: "int | float"
types:
  - name: Point
    doc: |
      A point on the plane.

      Args:
          x: Horizontal position.
          y: Vertical position.
    fields:
      - { name: x, type: Number }
      - { name: y, type: Number, default: 0 }
functions:
  - name: translate
    doc: |
      Move a point.

      Shifts the point one unit in the given direction.

      Args:
          point: The point to move.
          direction: Which way to move it.
    params:
      - { name: point, type: Point }
      - { name: direction, type: "Literal['left', 'right', 'up', 'down']", default: right }
    returns: Point
  - name: greet
    params:
      - { name: name, type: str }
    returns: str
"#;

/// Scratch directory with isolated config lookup
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn tools(&self) -> PathBuf {
        self.write("tools.yaml", TOOLS)
    }

    /// The binary, run inside the workspace with no ambient configuration
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("callschema").expect("binary");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("config"))
            .env_remove("CALLSCHEMA_CONFIG")
            .env_remove("CALLSCHEMA_LOG_FORMAT")
            .env_remove("RUST_LOG");
        cmd
    }
}

pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}
