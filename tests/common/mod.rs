// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};
use xcmatrix::infra::shell::ShellRunner;

pub const SCHEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Scheme version = "1.3">
   <TestAction
      shouldUseLaunchSchemeArgsEnv = "YES">
      <Testables>
      </Testables>
   </TestAction>
</Scheme>
"#;

/// Creates a temporary directory holding an empty `App.xcworkspace` and a
/// `Schemes/` directory with one shared scheme named `Unit Tests`.
pub fn setup_workspace() -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    fs::create_dir_all(temp_dir.path().join("App.xcworkspace")).expect("Failed to create workspace");
    let schemes = temp_dir.path().join("Schemes");
    fs::create_dir_all(&schemes).expect("Failed to create schemes directory");
    fs::write(schemes.join("Unit Tests.xcscheme"), SCHEME_XML).expect("Failed to write scheme");
    temp_dir
}

/// Writes a task file into `dir`. `{dir}` in `content` is replaced by the
/// directory path.
pub fn write_task(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("XcTasks.toml");
    let content = content.replace("{dir}", &dir.display().to_string());
    fs::write(&path, content).expect("Failed to write task file");
    path
}

/// Records every command and fails the ones containing any of `fail_on`.
#[derive(Debug, Default)]
pub struct RecordingShell {
    pub commands: Vec<String>,
    pub fail_on: Vec<String>,
}

impl RecordingShell {
    pub fn failing_on(patterns: &[&str]) -> Self {
        Self {
            commands: Vec::new(),
            fail_on: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Commands other than the simulator kill.
    pub fn test_commands(&self) -> Vec<&String> {
        self.commands.iter().filter(|c| !c.starts_with("killall")).collect()
    }
}

impl ShellRunner for RecordingShell {
    async fn run(&mut self, command: &str, _echo: bool) -> bool {
        self.commands.push(command.to_string());
        !self.fail_on.iter().any(|p| command.contains(p.as_str()))
    }
}
