use super::{
    atomic_write, check_dir_write_permission, check_write_permission, classify_io_error,
    create_backup, validate_markdown_structure,
};
use crate::error::{EmbedError, Result};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
pub struct SafeWriteOptions<'a> {
    pub backup_dir: &'a Path,
    /// Validate the written document and roll back when it looks broken.
    pub validate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafeWriteResult {
    pub success: bool,
    pub target_path: PathBuf,
    /// `None` when the target did not exist before the write.
    pub backup_path: Option<PathBuf>,
    pub rolled_back: bool,
}

/// Write `content` to `target` behind a verified backup.
///
/// Permission problems and backup failures abort before the target is
/// touched. A failed write leaves the original in place. A written document
/// that fails validation is rolled back and reported with
/// `success = false`; a rollback that itself fails is an error.
pub fn safe_write(
    target: &Path,
    content: &str,
    options: &SafeWriteOptions<'_>,
) -> Result<SafeWriteResult> {
    let check = check_write_permission(target);
    if !check.allowed {
        return Err(EmbedError::PermissionDenied {
            path: target.to_path_buf(),
            reason: check.reason.unwrap_or_else(|| "not writable".to_string()),
        });
    }
    let check = check_dir_write_permission(options.backup_dir);
    if !check.allowed {
        return Err(EmbedError::PermissionDenied {
            path: options.backup_dir.to_path_buf(),
            reason: format!(
                "cannot create backups: {}",
                check.reason.unwrap_or_else(|| "not writable".to_string())
            ),
        });
    }

    let backup_path = if target.exists() {
        let backup = create_backup(target, options.backup_dir)?;
        Some(backup.backup_path)
    } else {
        tracing::debug!(file = %target.display(), "target absent; nothing to back up");
        None
    };

    if let Err(err) = atomic_write(target, content) {
        return Err(EmbedError::WriteFailed {
            target: target.to_path_buf(),
            backup: backup_path,
            source: Box::new(err),
        });
    }

    if options.validate {
        let problem = match fs::read_to_string(target) {
            Ok(written) => {
                let validation = validate_markdown_structure(&written);
                (!validation.valid).then(|| validation.errors.join(", "))
            }
            Err(err) => Some(format!("cannot re-read written file: {err}")),
        };
        if let Some(problem) = problem {
            tracing::warn!(
                file = %target.display(),
                problem = %problem,
                "validation failed; rolling back"
            );
            rollback(target, backup_path.as_deref())?;
            return Ok(SafeWriteResult {
                success: false,
                target_path: target.to_path_buf(),
                backup_path,
                rolled_back: true,
            });
        }
    }

    tracing::info!(
        file = %target.display(),
        backup = ?backup_path,
        "safe write complete"
    );
    Ok(SafeWriteResult {
        success: true,
        target_path: target.to_path_buf(),
        backup_path,
        rolled_back: false,
    })
}

/// Put the target back the way it was: the backup content, or no file at all
/// when there was none.
fn rollback(target: &Path, backup: Option<&Path>) -> Result<()> {
    let restored = match backup {
        Some(backup) => fs::read_to_string(backup)
            .map_err(|err| classify_io_error("read backup", backup, err))
            .and_then(|original| atomic_write(target, &original)),
        None => match fs::remove_file(target) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(classify_io_error("remove new file", target, err)),
        },
    };
    restored.map_err(|err| {
        tracing::error!(
            file = %target.display(),
            backup = ?backup,
            error = %err,
            "rollback failed"
        );
        let mut reason = err.to_string();
        if let Some(source) = std::error::Error::source(&err) {
            reason.push_str(&format!(": {source}"));
        }
        EmbedError::RollbackFailed {
            target: target.to_path_buf(),
            backup: backup.map(Path::to_path_buf),
            reason,
        }
    })
}
