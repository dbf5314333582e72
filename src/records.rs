//! Snippet records consumed by the merge engine.
//!
//! Records arrive already parsed; the engine treats them as immutable values and
//! never persists them. The CLI loads them from a JSON manifest.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a skill was discovered.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    #[default]
    Global,
    Project,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Global => "global",
            Location::Project => "project",
        }
    }

    /// Parse a location tag case-insensitively; unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "global" => Some(Location::Global),
            "project" => Some(Location::Project),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common view over both record variants, used by the section generator.
pub trait Snippet {
    fn name(&self) -> &str;
    fn content(&self) -> &str;
}

/// Skill-like record: carries a location tag.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SkillRecord {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

/// Command-like record: no location.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl SkillRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            location,
            source: None,
        }
    }
}

impl CommandRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            source: None,
        }
    }
}

impl Snippet for SkillRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &str {
        &self.content
    }
}

impl Snippet for CommandRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &str {
        &self.content
    }
}

/// Records grouped by the section they populate.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
    #[serde(default)]
    pub commands: Vec<CommandRecord>,
}

impl RecordSet {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.commands.is_empty()
    }
}

/// Load a record manifest (`{"skills": [...], "commands": [...]}`) from disk.
pub fn load_records(path: &Path) -> Result<RecordSet> {
    let bytes = fs::read(path).with_context(|| format!("read records {}", path.display()))?;
    let records: RecordSet = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse records JSON {}", path.display()))?;
    for skill in &records.skills {
        if skill.name.trim().is_empty() {
            tracing::warn!(source = ?skill.source, "skill record has an empty name");
        }
    }
    for command in &records.commands {
        if command.name.trim().is_empty() {
            tracing::warn!(source = ?command.source, "command record has an empty name");
        }
    }
    Ok(records)
}
