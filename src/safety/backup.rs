use super::classify_io_error;
use crate::error::{EmbedError, Result};
use crate::util::{content_hash, split_file_name, CONTENT_HASH_LEN};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Label carried by snapshots taken right before a restore.
pub const PRE_RESTORE_LABEL: &str = "pre-restore";

// ISO 8601 in UTC with millisecond precision, `:` swapped for `-` so the
// name is valid on every filesystem.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3fZ";

/// Metadata encoded in a backup file name:
/// `{base}[_{label}]_{timestamp}_{hash}{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    pub base: String,
    pub label: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    /// Extension including the dot, empty when the target has none.
    pub ext: String,
}

impl BackupName {
    pub fn for_target(
        target_file_name: &str,
        timestamp: DateTime<Utc>,
        hash: &str,
        label: Option<&str>,
    ) -> Self {
        let (base, ext) = split_file_name(target_file_name);
        Self {
            base: base.to_string(),
            label: label.map(str::to_string),
            timestamp,
            hash: hash.to_string(),
            ext: ext.to_string(),
        }
    }

    pub fn file_name(&self) -> String {
        let stamp = self.timestamp.format(TIMESTAMP_FORMAT);
        match &self.label {
            Some(label) => format!("{}_{label}_{stamp}_{}{}", self.base, self.hash, self.ext),
            None => format!("{}_{stamp}_{}{}", self.base, self.hash, self.ext),
        }
    }

    pub fn is_pre_restore(&self) -> bool {
        self.label.as_deref() == Some(PRE_RESTORE_LABEL)
    }
}

/// Backup file name for a plain snapshot of `target_file_name`.
pub fn backup_filename(target_file_name: &str, timestamp: DateTime<Utc>, hash: &str) -> String {
    BackupName::for_target(target_file_name, timestamp, hash, None).file_name()
}

/// Parse a file from the backup directory back into its metadata. Returns
/// `None` for names that do not belong to `target_file_name` or do not follow
/// the naming scheme.
pub fn parse_backup_filename(file_name: &str, target_file_name: &str) -> Option<BackupName> {
    let (base, ext) = split_file_name(target_file_name);
    let rest = file_name.strip_prefix(base)?.strip_prefix('_')?;
    let rest = if ext.is_empty() {
        rest
    } else {
        rest.strip_suffix(ext)?
    };
    let (label, rest) = match rest
        .strip_prefix(PRE_RESTORE_LABEL)
        .and_then(|tail| tail.strip_prefix('_'))
    {
        Some(tail) => (Some(PRE_RESTORE_LABEL.to_string()), tail),
        None => (None, rest),
    };
    let (stamp, hash) = rest.rsplit_once('_')?;
    if !is_content_hash(hash) {
        return None;
    }
    let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .ok()?
        .and_utc();
    Some(BackupName {
        base: base.to_string(),
        label,
        timestamp,
        hash: hash.to_string(),
        ext: ext.to_string(),
    })
}

/// Whether `file_name` follows the backup naming scheme for any target:
/// `{base}[_{label}]_{timestamp}_{hash}{ext}`.
pub fn is_backup_file_name(file_name: &str) -> bool {
    // Extensionless targets leave `.123Z_...` looking like an extension.
    has_backup_suffix(split_file_name(file_name).0) || has_backup_suffix(file_name)
}

fn has_backup_suffix(stem: &str) -> bool {
    let Some((rest, hash)) = stem.rsplit_once('_') else {
        return false;
    };
    let Some((base, stamp)) = rest.rsplit_once('_') else {
        return false;
    };
    !base.is_empty()
        && is_content_hash(hash)
        && NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok()
}

fn is_content_hash(text: &str) -> bool {
    text.len() == CONTENT_HASH_LEN && text.chars().all(|c| c.is_ascii_hexdigit())
}

/// A verified snapshot on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupResult {
    pub backup_path: PathBuf,
    /// Content hash of the snapshot, also embedded in its file name.
    pub hash: String,
}

/// Snapshot `target` into `backup_dir`. The copy is re-read and re-hashed
/// before it is reported; an unverifiable backup is an error.
pub fn create_backup(target: &Path, backup_dir: &Path) -> Result<BackupResult> {
    create_labeled_backup(target, backup_dir, None)
}

pub fn create_labeled_backup(
    target: &Path,
    backup_dir: &Path,
    label: Option<&str>,
) -> Result<BackupResult> {
    let content = fs::read_to_string(target).map_err(|err| EmbedError::BackupFailed {
        target: target.to_path_buf(),
        reason: format!("cannot read target: {err}"),
    })?;
    let file_name = target
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| EmbedError::BackupFailed {
            target: target.to_path_buf(),
            reason: "target has no usable file name".to_string(),
        })?;

    let hash = content_hash(&content);
    let name = BackupName::for_target(file_name, Utc::now(), &hash, label);
    fs::create_dir_all(backup_dir)
        .map_err(|err| classify_io_error("create backup directory", backup_dir, err))?;
    let backup_path = backup_dir.join(name.file_name());
    fs::write(&backup_path, &content)
        .map_err(|err| classify_io_error("write backup", &backup_path, err))?;

    verify_backup(&backup_path, &hash)?;
    tracing::info!(
        file = %target.display(),
        backup = %backup_path.display(),
        hash = %hash,
        "created backup"
    );
    Ok(BackupResult { backup_path, hash })
}

/// Re-read a backup and check its content hash.
pub fn verify_backup(backup_path: &Path, expected_hash: &str) -> Result<()> {
    let actual = match fs::read_to_string(backup_path) {
        Ok(content) => content_hash(&content),
        Err(err) => format!("<unreadable: {err}>"),
    };
    if actual == expected_hash {
        return Ok(());
    }
    tracing::error!(
        backup = %backup_path.display(),
        expected = expected_hash,
        actual = %actual,
        "backup verification failed"
    );
    Err(EmbedError::BackupVerification {
        path: backup_path.to_path_buf(),
        expected: expected_hash.to_string(),
        actual,
    })
}
