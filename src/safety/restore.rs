use super::{
    atomic_write, classify_io_error, create_labeled_backup, parse_backup_filename,
    PRE_RESTORE_LABEL,
};
use crate::error::{EmbedError, Result};
use crate::util::{content_hash, split_file_name};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One backup found in the backup directory. Everything except `size` comes
/// from the file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    /// Backup file name inside the backup directory.
    pub filename: String,
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    pub size: u64,
    /// Snapshot taken automatically before a restore.
    pub pre_restore: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreResult {
    pub target_path: PathBuf,
    pub restored_from: PathBuf,
    /// Snapshot of the content that was replaced; `None` when the target did
    /// not exist.
    pub pre_restore_backup: Option<PathBuf>,
    pub hash: String,
}

/// Backups of `target_filename` in `backup_dir`, newest first. A missing
/// directory yields an empty list; names that do not parse are skipped.
pub fn discover_backups(backup_dir: &Path, target_filename: &str) -> Result<Vec<BackupInfo>> {
    let entries = match fs::read_dir(backup_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(classify_io_error("read backup directory", backup_dir, err)),
    };
    let (base, ext) = split_file_name(target_filename);
    let prefix = format!("{base}_");

    let mut backups = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable backup entry");
                continue;
            }
        };
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !name.starts_with(&prefix) || !name.ends_with(ext) {
            continue;
        }
        let Some(parsed) = parse_backup_filename(&name, target_filename) else {
            tracing::warn!(file = %name, "skipping invalid backup file");
            continue;
        };
        let path = entry.path();
        let size = match entry.metadata() {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(backup = %path.display(), error = %err, "failed to stat backup");
                continue;
            }
        };
        backups.push(BackupInfo {
            pre_restore: parsed.is_pre_restore(),
            filename: name,
            path,
            timestamp: parsed.timestamp,
            hash: parsed.hash,
            size,
        });
    }
    backups.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.filename.cmp(&a.filename))
    });
    Ok(backups)
}

/// Newest regular backup. Pre-restore snapshots are skipped so restoring
/// "latest" twice does not undo the first restore.
pub fn latest_backup(backup_dir: &Path, target_filename: &str) -> Result<Option<BackupInfo>> {
    Ok(discover_backups(backup_dir, target_filename)?
        .into_iter()
        .find(|backup| !backup.pre_restore))
}

/// Replace `target_path` with the content of `backup_path`.
///
/// The current target is snapshotted first (tagged `pre-restore`) so a
/// restore of the wrong version is itself recoverable. When the backup name
/// carries a hash, the content must still match it.
pub fn restore_from_backup(
    backup_path: &Path,
    target_path: &Path,
    backup_dir: &Path,
) -> Result<RestoreResult> {
    let content = fs::read_to_string(backup_path).map_err(|err| EmbedError::RestoreFailed {
        backup: backup_path.to_path_buf(),
        reason: match err.kind() {
            io::ErrorKind::NotFound => "backup file not found".to_string(),
            io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => err.to_string(),
        },
    })?;
    let hash = content_hash(&content);

    let target_name = target_path.file_name().and_then(|name| name.to_str());
    let backup_name = backup_path.file_name().and_then(|name| name.to_str());
    if let (Some(target_name), Some(backup_name)) = (target_name, backup_name) {
        if let Some(parsed) = parse_backup_filename(backup_name, target_name) {
            if parsed.hash != hash {
                tracing::error!(
                    backup = %backup_path.display(),
                    expected = %parsed.hash,
                    actual = %hash,
                    "backup content does not match its name"
                );
                return Err(EmbedError::BackupVerification {
                    path: backup_path.to_path_buf(),
                    expected: parsed.hash,
                    actual: hash,
                });
            }
        }
    }

    let pre_restore_backup = if target_path.exists() {
        let snapshot = create_labeled_backup(target_path, backup_dir, Some(PRE_RESTORE_LABEL))?;
        Some(snapshot.backup_path)
    } else {
        None
    };

    atomic_write(target_path, &content)?;
    tracing::info!(
        file = %target_path.display(),
        backup = %backup_path.display(),
        pre_restore = ?pre_restore_backup,
        "restored from backup"
    );
    Ok(RestoreResult {
        target_path: target_path.to_path_buf(),
        restored_from: backup_path.to_path_buf(),
        pre_restore_backup,
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::{backup_filename, create_backup};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 3, hour, 0, 0)
            .single()
            .expect("valid date")
    }

    #[test]
    fn missing_directory_has_no_backups() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let found = discover_backups(&dir.path().join("absent"), "CLAUDE.md").expect("discover");
        assert!(found.is_empty());
    }

    #[test]
    fn discovers_newest_first_and_skips_junk() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let older = backup_filename("CLAUDE.md", at(9), &content_hash("a"));
        let newer = backup_filename("CLAUDE.md", at(10), &content_hash("bb"));
        fs::write(dir.path().join(&older), "a").expect("write");
        fs::write(dir.path().join(&newer), "bb").expect("write");
        fs::write(dir.path().join("CLAUDE_garbage.md"), "x").expect("write");
        fs::write(
            dir.path().join(backup_filename("AGENTS.md", at(11), &content_hash("c"))),
            "c",
        )
        .expect("write");

        let found = discover_backups(dir.path(), "CLAUDE.md").expect("discover");
        let names: Vec<&str> = found.iter().map(|b| b.filename.as_str()).collect();
        assert_eq!(names, vec![newer.as_str(), older.as_str()]);
        assert_eq!(found[0].size, 2);
        assert_eq!(found[0].timestamp, at(10));
        assert_eq!(found[0].hash, content_hash("bb"));
    }

    #[test]
    fn restore_snapshots_current_content_first() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let target = dir.path().join("CLAUDE.md");
        let backups = dir.path().join("backups");
        fs::write(&target, "# v1\n").expect("seed");
        let backup = create_backup(&target, &backups).expect("backup");
        fs::write(&target, "# v2\n").expect("edit");

        let result = restore_from_backup(&backup.backup_path, &target, &backups).expect("restore");
        assert_eq!(fs::read_to_string(&target).expect("read"), "# v1\n");
        let snapshot = result.pre_restore_backup.expect("pre-restore snapshot");
        assert_eq!(fs::read_to_string(&snapshot).expect("read"), "# v2\n");

        let found = discover_backups(&backups, "CLAUDE.md").expect("discover");
        assert_eq!(found.len(), 2);
        assert_eq!(found.iter().filter(|b| b.pre_restore).count(), 1);
        let latest = latest_backup(&backups, "CLAUDE.md")
            .expect("latest")
            .expect("some backup");
        assert_eq!(latest.path, backup.backup_path);
    }

    #[test]
    fn restore_onto_missing_target_skips_snapshot() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let backup = dir
            .path()
            .join(backup_filename("CLAUDE.md", at(8), &content_hash("# saved")));
        fs::write(&backup, "# saved").expect("write");
        let target = dir.path().join("CLAUDE.md");

        let result = restore_from_backup(&backup, &target, dir.path()).expect("restore");
        assert!(result.pre_restore_backup.is_none());
        assert_eq!(fs::read_to_string(&target).expect("read"), "# saved");
    }

    #[test]
    fn tampered_backup_is_refused() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let backup = dir
            .path()
            .join(backup_filename("CLAUDE.md", at(8), &content_hash("# saved")));
        fs::write(&backup, "# edited later").expect("write");
        let target = dir.path().join("CLAUDE.md");
        fs::write(&target, "# current").expect("seed");

        let err = restore_from_backup(&backup, &target, dir.path()).expect_err("hash mismatch");
        assert!(matches!(err, EmbedError::BackupVerification { .. }));
        assert_eq!(fs::read_to_string(&target).expect("read"), "# current");
    }

    #[test]
    fn missing_backup_is_reported() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = restore_from_backup(
            &dir.path().join("nope.md"),
            &dir.path().join("CLAUDE.md"),
            dir.path(),
        )
        .expect_err("missing backup");
        assert!(err.to_string().contains("backup file not found"));
    }
}
