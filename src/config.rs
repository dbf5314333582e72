//! Optional per-project configuration.
//!
//! A missing config file is not an error; every field has a default and the
//! command line overrides whatever the file says.
use crate::safety::DEFAULT_RETENTION_DAYS;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".agent-embed.json";
pub const DEFAULT_BACKUP_DIR: &str = ".agent-embed-backups";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EmbedConfig {
    pub schema_version: u32,
    /// Backup directory; relative paths resolve against the working directory.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Structural validation (and rollback) after every write.
    #[serde(default = "default_validate")]
    pub validate: bool,
    /// Prune expired backups after each successful write.
    #[serde(default)]
    pub cleanup_after_write: bool,
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BACKUP_DIR)
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_validate() -> bool {
    true
}

impl EmbedConfig {
    /// Backup directory resolved against `base` when relative.
    pub fn backup_dir_in(&self, base: &Path) -> PathBuf {
        if self.backup_dir.is_absolute() {
            self.backup_dir.clone()
        } else {
            base.join(&self.backup_dir)
        }
    }
}

/// Config used when no file is present.
pub fn default_config() -> EmbedConfig {
    EmbedConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        backup_dir: default_backup_dir(),
        retention_days: default_retention_days(),
        validate: default_validate(),
        cleanup_after_write: false,
    }
}

pub fn load_config(path: &Path) -> Result<EmbedConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: EmbedConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    Ok(config)
}

pub fn validate_config(config: &EmbedConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.retention_days == 0 {
        return Err(anyhow!("retention_days must be at least 1"));
    }
    if config.backup_dir.as_os_str().is_empty() {
        return Err(anyhow!("backup_dir must be non-empty"));
    }
    Ok(())
}

/// Find, load, and validate the effective config.
///
/// An explicit path must exist. Otherwise `{cwd}/.agent-embed.json` is used
/// when present, and the defaults when not.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<EmbedConfig> {
    let config = match explicit {
        Some(path) => load_config(path)?,
        None => {
            let path = cwd.join(CONFIG_FILE_NAME);
            if path.is_file() {
                tracing::debug!(config = %path.display(), "loading project config");
                load_config(&path)?
            } else {
                default_config()
            }
        }
    };
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
