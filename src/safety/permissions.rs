use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Outcome of a permission check. `reason` is set whenever `allowed` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl PermissionCheck {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Whether `path` can be written: the file itself when it exists, otherwise
/// its parent directory.
pub fn check_write_permission(path: &Path) -> PermissionCheck {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => try_create_in(path),
        Ok(_) => match OpenOptions::new().append(true).open(path) {
            Ok(_) => PermissionCheck::allowed(),
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => PermissionCheck::denied(
                format!("No write permission for file: {}", path.display()),
            ),
            Err(err) => PermissionCheck::denied(err.to_string()),
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let parent = parent_dir(path);
            if !parent.is_dir() {
                return PermissionCheck::denied(format!(
                    "Directory does not exist: {}",
                    parent.display()
                ));
            }
            try_create_in(parent)
        }
        Err(err) => PermissionCheck::denied(err.to_string()),
    }
}

/// Whether a directory can be written, or created: a missing directory is
/// checked through its nearest existing ancestor.
pub fn check_dir_write_permission(dir: &Path) -> PermissionCheck {
    let mut current = Some(dir);
    while let Some(candidate) = current {
        let existing = if candidate.as_os_str().is_empty() {
            Path::new(".")
        } else {
            candidate
        };
        if existing.exists() {
            if !existing.is_dir() {
                return PermissionCheck::denied(format!(
                    "Not a directory: {}",
                    existing.display()
                ));
            }
            return try_create_in(existing);
        }
        current = candidate.parent();
    }
    PermissionCheck::denied(format!("No existing ancestor for {}", dir.display()))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

// Mode bits do not tell the whole story (ACLs, read-only mounts), so create
// and drop a real file.
fn try_create_in(dir: &Path) -> PermissionCheck {
    match tempfile::Builder::new()
        .prefix(".agent-embed-check.")
        .tempfile_in(dir)
    {
        Ok(_) => PermissionCheck::allowed(),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => PermissionCheck::denied(
            format!("No write permission for directory: {}", dir.display()),
        ),
        Err(err) => PermissionCheck::denied(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_and_missing_file_in_existing_dir_are_writable() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let file = dir.path().join("CLAUDE.md");
        assert!(check_write_permission(&file).allowed);
        fs::write(&file, "# x").expect("seed");
        assert!(check_write_permission(&file).allowed);
    }

    #[test]
    fn missing_parent_is_denied_with_reason() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let file = dir.path().join("nope").join("CLAUDE.md");
        let check = check_write_permission(&file);
        assert!(!check.allowed);
        assert!(check
            .reason
            .expect("reason")
            .starts_with("Directory does not exist"));
    }

    #[test]
    fn missing_backup_dir_is_checked_through_ancestor() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let backups = dir.path().join("a").join("b").join("backups");
        assert!(check_dir_write_permission(&backups).allowed);
        assert!(!backups.exists());
    }

    #[test]
    fn file_in_place_of_backup_dir_is_denied() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let blocker = dir.path().join("backups");
        fs::write(&blocker, "x").expect("seed");
        assert!(!check_dir_write_permission(&blocker).allowed);
    }

    #[test]
    fn permission_check_leaves_no_files_behind() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(check_dir_write_permission(dir.path()).allowed);
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }
}
