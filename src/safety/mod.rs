//! Write-safety pipeline for the target document.
//!
//! Every mutation is snapshot -> atomic replace -> validate, with rollback
//! from the snapshot when validation fails. The backup directory listing is
//! the only index of snapshots.
use crate::error::EmbedError;
use std::io;
use std::path::Path;

mod atomic;
mod backup;
mod line_endings;
mod permissions;
mod restore;
mod retention;
mod safe_write;
mod validate;

pub use atomic::{atomic_write, temp_path_prefix};
pub use backup::{
    backup_filename, create_backup, create_labeled_backup, is_backup_file_name,
    parse_backup_filename, verify_backup, BackupName, BackupResult, PRE_RESTORE_LABEL,
};
pub use line_endings::{
    detect_line_ending, has_mixed_line_endings, normalize_line_ending, LineEnding,
};
pub use permissions::{check_dir_write_permission, check_write_permission, PermissionCheck};
pub use restore::{discover_backups, latest_backup, restore_from_backup, BackupInfo, RestoreResult};
pub use retention::{
    cleanup_old_backups, cleanup_old_backups_at, CleanupResult, DEFAULT_RETENTION_DAYS,
};
pub use safe_write::{safe_write, SafeWriteOptions, SafeWriteResult};
pub use validate::{validate_markdown_structure, ValidationResult};

/// Map an I/O failure onto the error taxonomy: disk full, permission denied,
/// missing directory, or a generic I/O error.
pub fn classify_io_error(op: &'static str, path: &Path, err: io::Error) -> EmbedError {
    if err.raw_os_error() == Some(libc::ENOSPC) {
        return EmbedError::OutOfSpace {
            path: path.to_path_buf(),
        };
    }
    match err.kind() {
        io::ErrorKind::PermissionDenied => EmbedError::PermissionDenied {
            path: path.to_path_buf(),
            reason: format!("{op}: {err}"),
        },
        _ => EmbedError::io(op, path, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_disk_full_and_permission_errors() {
        let path = Path::new("/tmp/CLAUDE.md");
        let full = classify_io_error("write", path, io::Error::from_raw_os_error(libc::ENOSPC));
        assert!(matches!(full, EmbedError::OutOfSpace { .. }));

        let denied = classify_io_error(
            "write",
            path,
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(denied, EmbedError::PermissionDenied { .. }));

        let other = classify_io_error("write", path, io::Error::other("boom"));
        assert!(matches!(other, EmbedError::Io { op: "write", .. }));
    }
}
