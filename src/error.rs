//! Error taxonomy for the merge engine and write-safety pipeline.
//!
//! Every variant raised after a backup exists carries the backup path so an
//! operator can always recover by hand.
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::embedding::SectionKind;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Errors surfaced by the engine. Expected conditions (missing target on first
/// run, missing backup directory) are never reported through this type.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("insufficient disk space to write {}", .path.display())]
    OutOfSpace { path: PathBuf },

    #[error("permission denied for {}: {reason}", .path.display())]
    PermissionDenied { path: PathBuf, reason: String },

    #[error("directory does not exist: {}", .dir.display())]
    ParentMissing { dir: PathBuf },

    #[error("{op} failed for {}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("backup creation failed for {}: {reason}", .target.display())]
    BackupFailed { target: PathBuf, reason: String },

    #[error(
        "backup verification failed for {}: expected hash {expected}, got {actual}",
        .path.display()
    )]
    BackupVerification {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error(
        "write failed for {} (backup available at {})",
        .target.display(),
        display_opt(.backup.as_deref())
    )]
    WriteFailed {
        target: PathBuf,
        backup: Option<PathBuf>,
        #[source]
        source: Box<EmbedError>,
    },

    #[error(
        "rollback failed after validation failure: target {}, backup {}: {reason}; manual intervention required",
        .target.display(),
        display_opt(.backup.as_deref())
    )]
    RollbackFailed {
        target: PathBuf,
        backup: Option<PathBuf>,
        reason: String,
    },

    #[error(
        "human content changed during merge of {}: expected hash {expected}, actual hash {actual}; backup available at {}",
        .target.display(),
        display_opt(.backup.as_deref())
    )]
    HumanContentChanged {
        target: PathBuf,
        backup: Option<PathBuf>,
        expected: String,
        actual: String,
    },

    #[error("sections {first} and {second} overlap (lines {first_range:?} and {second_range:?})")]
    OverlappingSections {
        first: SectionKind,
        second: SectionKind,
        first_range: (usize, usize),
        second_range: (usize, usize),
    },

    #[error("cannot restore from {}: {reason}", .backup.display())]
    RestoreFailed { backup: PathBuf, reason: String },
}

impl EmbedError {
    /// Build an I/O error tagged with the operation and path that failed.
    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        EmbedError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for integrity failures that must never be retried automatically.
    pub fn requires_manual_intervention(&self) -> bool {
        matches!(
            self,
            EmbedError::BackupVerification { .. }
                | EmbedError::RollbackFailed { .. }
                | EmbedError::HumanContentChanged { .. }
        )
    }

    /// Backup path to use for manual recovery, when one exists.
    pub fn backup_path(&self) -> Option<&Path> {
        match self {
            EmbedError::WriteFailed { backup, .. }
            | EmbedError::RollbackFailed { backup, .. }
            | EmbedError::HumanContentChanged { backup, .. } => backup.as_deref(),
            _ => None,
        }
    }

    /// Actionable steps printed by the CLI next to the error.
    pub fn remediation(&self) -> Vec<String> {
        match self {
            EmbedError::OutOfSpace { .. } => vec!["Free up disk space and try again".to_string()],
            EmbedError::PermissionDenied { path, .. } => vec![
                format!("Check permissions with `ls -la {}`", path.display()),
                "Ensure you have write access to the file and its directory".to_string(),
            ],
            EmbedError::ParentMissing { dir } => {
                vec![format!("Create the directory first: mkdir -p \"{}\"", dir.display())]
            }
            EmbedError::HumanContentChanged {
                target,
                backup: Some(backup),
                ..
            }
            | EmbedError::RollbackFailed {
                target,
                backup: Some(backup),
                ..
            } => vec![
                format!("Compare: diff \"{}\" \"{}\"", backup.display(), target.display()),
                format!("Restore with: cp \"{}\" \"{}\"", backup.display(), target.display()),
            ],
            EmbedError::WriteFailed {
                target,
                backup: Some(backup),
                ..
            } => vec![format!(
                "The original is untouched; a copy is at {} if {} looks wrong",
                backup.display(),
                target.display()
            )],
            _ => Vec::new(),
        }
    }
}

fn display_opt(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<none>".to_string())
}
