use super::{classify_io_error, is_backup_file_name};
use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

pub const DEFAULT_RETENTION_DAYS: u32 = 30;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupResult {
    pub deleted_count: usize,
    pub deleted_files: Vec<String>,
    pub kept_count: usize,
}

/// Delete backups whose modification time is older than `retention_days`.
/// Only files named like backups are considered; others are neither kept nor
/// deleted.
pub fn cleanup_old_backups(backup_dir: &Path, retention_days: u32) -> Result<CleanupResult> {
    cleanup_old_backups_at(backup_dir, retention_days, SystemTime::now())
}

/// Same as [`cleanup_old_backups`] with an explicit clock. A file whose mtime
/// equals the cutoff is kept. Failures on individual files are logged and
/// skipped; a missing directory is an empty result.
pub fn cleanup_old_backups_at(
    backup_dir: &Path,
    retention_days: u32,
    now: SystemTime,
) -> Result<CleanupResult> {
    let mut result = CleanupResult::default();
    let entries = match fs::read_dir(backup_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(result),
        Err(err) => return Err(classify_io_error("read backup directory", backup_dir, err)),
    };
    let cutoff = now
        .checked_sub(Duration::from_secs(u64::from(retention_days) * SECONDS_PER_DAY))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => names.push(entry.file_name()),
            Err(err) => tracing::warn!(error = %err, "skipping unreadable backup entry"),
        }
    }
    names.sort();

    for name in names {
        let Some(name) = name.to_str().map(str::to_string) else {
            continue;
        };
        // Temporary files from in-flight writes start with a dot; anything not
        // named like a backup is not ours to delete.
        if name.starts_with('.') || !is_backup_file_name(&name) {
            tracing::debug!(file = %name, "not a backup; leaving it alone");
            continue;
        }
        let path = backup_dir.join(&name);
        let modified = match fs::metadata(&path).and_then(|meta| {
            if meta.is_dir() {
                Ok(None)
            } else {
                meta.modified().map(Some)
            }
        }) {
            Ok(Some(modified)) => modified,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(backup = %path.display(), error = %err, "failed to stat backup");
                continue;
            }
        };

        if modified >= cutoff {
            result.kept_count += 1;
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(backup = %path.display(), "deleted expired backup");
                result.deleted_count += 1;
                result.deleted_files.push(name);
            }
            Err(err) => {
                tracing::warn!(backup = %path.display(), error = %err, "failed to delete backup");
            }
        }
    }

    tracing::info!(
        dir = %backup_dir.display(),
        deleted = result.deleted_count,
        kept = result.kept_count,
        "backup cleanup finished"
    );
    Ok(result)
}
