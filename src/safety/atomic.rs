use super::classify_io_error;
use crate::error::{EmbedError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Prefix of the temporary files created next to `target`
/// (`.CLAUDE.md.tmp.<random>`).
pub fn temp_path_prefix(target: &Path) -> String {
    let file_name = target
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("staged");
    format!(".{file_name}.tmp.")
}

/// Replace `target` with `content` via a temporary file in the same directory
/// and a rename, so readers never observe a half-written file.
///
/// A failed attempt leaves the target untouched and keeps the temporary file
/// for inspection.
pub fn atomic_write(target: &Path, content: &str) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(EmbedError::ParentMissing {
            dir: dir.to_path_buf(),
        });
    }

    let prefix = temp_path_prefix(target);
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).rand_bytes(16);
    // New documents get the usual umask-filtered mode instead of 0600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let tmp = builder
        .tempfile_in(dir)
        .map_err(|err| classify_io_error("create temp file", target, err))?;
    // Detach from automatic cleanup so a failed write stays on disk.
    let (mut file, tmp_path) = tmp
        .keep()
        .map_err(|err| classify_io_error("create temp file", target, err.error))?;

    let written = copy_permissions(target, &file)
        .and_then(|()| file.write_all(content.as_bytes()))
        .and_then(|()| file.sync_all());
    drop(file);
    if let Err(err) = written {
        tracing::warn!(temp = %tmp_path.display(), "atomic write failed; temp file kept");
        return Err(classify_io_error("write temp file", target, err));
    }

    if let Err(err) = fs::rename(&tmp_path, target) {
        tracing::warn!(temp = %tmp_path.display(), "rename failed; temp file kept");
        if err.kind() == io::ErrorKind::NotFound {
            return Err(EmbedError::ParentMissing {
                dir: dir.to_path_buf(),
            });
        }
        return Err(classify_io_error("rename temp file", target, err));
    }
    tracing::debug!(file = %target.display(), bytes = content.len(), "atomic write complete");
    Ok(())
}

/// Carry the mode of an existing target over to its replacement.
fn copy_permissions(target: &Path, file: &fs::File) -> io::Result<()> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_file() => file.set_permissions(meta.permissions()),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
