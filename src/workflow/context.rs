use crate::cli::GlobalArgs;
use agent_embed::config::{resolve_config, EmbedConfig};
use agent_embed::safety::cleanup_old_backups;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Effective settings for one invocation: config file merged with flags.
pub(crate) struct WorkflowContext {
    pub(crate) config: EmbedConfig,
    pub(crate) backup_dir: PathBuf,
}

impl WorkflowContext {
    pub(crate) fn load(global: &GlobalArgs) -> Result<Self> {
        let cwd = env::current_dir().context("resolve working directory")?;
        let config = resolve_config(global.config.as_deref(), &cwd)?;
        let backup_dir = match &global.backup_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => config.backup_dir_in(&cwd),
        };
        tracing::debug!(backup_dir = %backup_dir.display(), "resolved backup directory");
        Ok(Self { config, backup_dir })
    }

    /// Prune expired backups when the config asks for it after each write.
    pub(crate) fn after_write(&self) -> Result<()> {
        if !self.config.cleanup_after_write {
            return Ok(());
        }
        let result = cleanup_old_backups(&self.backup_dir, self.config.retention_days)?;
        if result.deleted_count > 0 {
            tracing::info!(deleted = result.deleted_count, "pruned expired backups");
        }
        Ok(())
    }
}
