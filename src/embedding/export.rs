use super::generate_sections;
use crate::error::Result;
use crate::records::RecordSet;
use crate::safety::{atomic_write, safe_write, SafeWriteOptions, SafeWriteResult};
use std::path::Path;

/// Title of a standalone export document.
pub const EXPORT_TITLE: &str = "# Exported Skills and Commands";

/// Render `records` as a standalone document that another file can include.
pub fn generate_export_content(records: &RecordSet) -> String {
    let mut parts = vec![EXPORT_TITLE.to_string()];
    parts.extend(generate_sections(records).into_values());
    let mut text = parts.join("\n\n");
    text.push('\n');
    text
}

/// Write the export document to `out`. A new file is written atomically; an
/// existing one goes through the safe writer so it can be recovered.
pub fn write_export(
    records: &RecordSet,
    out: &Path,
    options: &SafeWriteOptions<'_>,
) -> Result<SafeWriteResult> {
    let content = generate_export_content(records);
    if out.exists() {
        return safe_write(out, &content, options);
    }
    atomic_write(out, &content)?;
    tracing::info!(file = %out.display(), "exported records");
    Ok(SafeWriteResult {
        success: true,
        target_path: out.to_path_buf(),
        backup_path: None,
        rolled_back: false,
    })
}
