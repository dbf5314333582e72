//! Backup directory commands: backups, restore, cleanup.
use super::{print_json, target_file_name, WorkflowContext};
use crate::cli::{BackupsArgs, CleanupArgs, RestoreArgs};
use agent_embed::safety::{
    cleanup_old_backups, discover_backups, latest_backup, restore_from_backup,
};
use anyhow::{anyhow, Result};

pub(crate) fn run_backups(ctx: &WorkflowContext, args: &BackupsArgs) -> Result<()> {
    let name = target_file_name(&args.target)?;
    let backups = discover_backups(&ctx.backup_dir, name)?;
    if args.json {
        return print_json(&backups, "backups");
    }
    if backups.is_empty() {
        println!("no backups of {name} in {}", ctx.backup_dir.display());
        return Ok(());
    }
    for backup in &backups {
        let tag = if backup.pre_restore { " (pre-restore)" } else { "" };
        println!(
            "{}  {:>8} B  {}{tag}",
            backup.timestamp.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            backup.size,
            backup.path.display()
        );
    }
    Ok(())
}

pub(crate) fn run_restore(ctx: &WorkflowContext, args: &RestoreArgs) -> Result<()> {
    let backup = match &args.backup {
        Some(path) => path.clone(),
        None => {
            let name = target_file_name(&args.target)?;
            latest_backup(&ctx.backup_dir, name)?
                .map(|info| info.path)
                .ok_or_else(|| {
                    anyhow!("no backups of {name} in {}", ctx.backup_dir.display())
                })?
        }
    };
    let result = restore_from_backup(&backup, &args.target, &ctx.backup_dir)?;
    println!(
        "restored {} from {}",
        result.target_path.display(),
        result.restored_from.display()
    );
    if let Some(snapshot) = &result.pre_restore_backup {
        println!("previous content saved to {}", snapshot.display());
    }
    Ok(())
}

pub(crate) fn run_cleanup(ctx: &WorkflowContext, args: &CleanupArgs) -> Result<()> {
    let retention_days = args.retention_days.unwrap_or(ctx.config.retention_days);
    let result = cleanup_old_backups(&ctx.backup_dir, retention_days)?;
    if args.json {
        return print_json(&result, "cleanup result");
    }
    for name in &result.deleted_files {
        println!("deleted {name}");
    }
    println!(
        "deleted {}, kept {} (retention {retention_days} days)",
        result.deleted_count, result.kept_count
    );
    Ok(())
}
