//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use agent_embed::records::{CommandRecord, Location, RecordSet, SkillRecord};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Isolated project directory holding a target document and its backups.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn target(&self) -> PathBuf {
        self.path("CLAUDE.md")
    }

    pub fn backups(&self) -> PathBuf {
        self.path(".agent-embed-backups")
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents.as_bytes()).expect("write file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("read file")
    }

    pub fn write_records(&self, rel: &str, records: &RecordSet) -> PathBuf {
        let text = serde_json::to_string_pretty(records).expect("serialize records");
        self.write(rel, &text)
    }

    /// Run the CLI with this workspace as the working directory.
    pub fn run(&self, args: &[&str]) -> CliOutput {
        let output = Command::new(env!("CARGO_BIN_EXE_agent-embed"))
            .args(args)
            .current_dir(self.root())
            .env_remove("RUST_LOG")
            .output()
            .expect("run agent-embed");
        CliOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

#[derive(Debug)]
pub struct CliOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CliOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "command failed\nstdout:\n{}\nstderr:\n{}",
            self.stdout, self.stderr
        );
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).expect("stdout is JSON")
    }
}

pub fn skill(name: &str, content: &str) -> SkillRecord {
    SkillRecord::new(name, content, Location::Global)
}

pub fn command(name: &str, content: &str) -> CommandRecord {
    CommandRecord::new(name, content)
}

pub fn records(skills: Vec<SkillRecord>, commands: Vec<CommandRecord>) -> RecordSet {
    RecordSet { skills, commands }
}
