//! Merge orchestration: split, regenerate, reassemble, write, verify.
//!
//! The write itself is a snapshot -> mutate -> verify-or-rollback protocol;
//! [`plan_merge`] covers everything before the mutation so dry runs share the
//! exact same text.
use super::{
    generate_sections, generate_template, split_document, SectionKind, SplitResult,
    TemplateOptions, SEPARATOR,
};
use crate::error::{EmbedError, Result};
use crate::records::RecordSet;
use crate::safety::{
    atomic_write, classify_io_error, detect_line_ending, has_mixed_line_endings,
    normalize_line_ending, safe_write, LineEnding, SafeWriteOptions,
};
use crate::util::content_hash;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Inputs for one merge run.
#[derive(Debug, Clone, Copy)]
pub struct MergeOptions<'a> {
    pub target_path: &'a Path,
    pub records: &'a RecordSet,
    pub backup_dir: &'a Path,
    /// Run structural validation (and rollback) after writing.
    pub validate: bool,
}

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    pub success: bool,
    /// The regenerated document matched the existing one; nothing was written.
    pub skipped: bool,
    /// The target did not exist and was created from the template.
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    pub human_content_hash: String,
    /// Validation failed after writing and the backup was restored.
    pub rolled_back: bool,
}

/// Everything a merge would do, computed without touching the filesystem
/// beyond reading the target.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub target_path: PathBuf,
    /// Document as read (or the synthesized template).
    pub existing: String,
    pub split: SplitResult,
    pub merged_content: String,
    pub created: bool,
    /// True when the write would be skipped as a no-op.
    pub unchanged: bool,
    pub line_ending: LineEnding,
}

impl MergePlan {
    pub fn human_content_hash(&self) -> &str {
        &self.split.human_content_hash
    }
}

fn blank_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run regex is valid"))
}

/// Normalize a document for idempotency comparison: trim, LF line endings,
/// runs of three or more newlines collapsed to two.
pub fn normalize_for_comparison(content: &str) -> String {
    let lf = content.trim().replace("\r\n", "\n");
    blank_run().replace_all(&lf, "\n\n").into_owned()
}

/// Reassemble human content and generated sections into one document.
pub fn assemble_document(human_content: &str, sections: &BTreeMap<SectionKind, String>) -> String {
    let human = human_content.trim();
    let mut parts: Vec<&str> = Vec::new();
    if !human.is_empty() {
        parts.push(human);
        parts.push("");
    }
    if !human.ends_with(SEPARATOR) {
        parts.push(SEPARATOR);
        parts.push("");
    }
    let rendered: Vec<&str> = SectionKind::ALL
        .iter()
        .filter_map(|kind| sections.get(kind))
        .map(String::as_str)
        .filter(|text| !text.is_empty())
        .collect();
    for (idx, section) in rendered.into_iter().enumerate() {
        if idx > 0 {
            parts.push("");
        }
        parts.push(section);
    }
    parts.join("\n").trim().to_string()
}

/// Compute the merged document for `target_path` without writing it.
pub fn plan_merge(target_path: &Path, records: &RecordSet) -> Result<MergePlan> {
    let (existing, created) = match fs::read_to_string(target_path) {
        Ok(text) => (text, false),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(file = %target_path.display(), "target missing; starting from template");
            let template = generate_template(TemplateOptions {
                include_skills: !records.skills.is_empty(),
                include_commands: !records.commands.is_empty(),
            });
            (template, true)
        }
        Err(err) => return Err(classify_io_error("read target", target_path, err)),
    };

    let split = split_document(&existing)?;
    let sections = generate_sections(records);
    // Re-encoding a mixed document would rewrite human bytes; leave its line
    // breaks as they are and emit the generated parts with LF.
    let line_ending = match detect_line_ending(&existing) {
        LineEnding::Crlf if has_mixed_line_endings(&existing) => {
            tracing::debug!(file = %target_path.display(), "mixed line endings; keeping LF");
            LineEnding::Lf
        }
        ending => ending,
    };
    let merged_content = match line_ending {
        LineEnding::Lf => assemble_document(&split.human_content, &sections),
        LineEnding::Crlf => normalize_line_ending(
            &assemble_document(&split.human_content, &sections),
            LineEnding::Crlf,
        ),
    };

    let unchanged = !created
        && content_hash(&normalize_for_comparison(&existing))
            == content_hash(&normalize_for_comparison(&merged_content));

    Ok(MergePlan {
        target_path: target_path.to_path_buf(),
        existing,
        split,
        merged_content,
        created,
        unchanged,
        line_ending,
    })
}

/// Regenerate the machine-owned sections of the target document.
///
/// New documents are written atomically; existing ones go through the safe
/// writer and are re-read afterwards to prove the human content hash did not
/// change.
pub fn merge_embedded_content(options: &MergeOptions<'_>) -> Result<MergeResult> {
    let target = options.target_path;
    let plan = plan_merge(target, options.records)?;
    let expected_hash = plan.human_content_hash().to_string();
    let expected_fingerprint = human_fingerprint(&plan.split.human_content);

    if plan.unchanged {
        tracing::info!(file = %target.display(), "content unchanged; skipping write");
        return Ok(MergeResult {
            success: true,
            skipped: true,
            created: false,
            backup_path: None,
            human_content_hash: expected_hash,
            rolled_back: false,
        });
    }

    if plan.created {
        atomic_write(target, &plan.merged_content)?;
        tracing::info!(file = %target.display(), "created target document");
        return Ok(MergeResult {
            success: true,
            skipped: false,
            created: true,
            backup_path: None,
            human_content_hash: expected_hash,
            rolled_back: false,
        });
    }

    let write = safe_write(
        target,
        &plan.merged_content,
        &SafeWriteOptions {
            backup_dir: options.backup_dir,
            validate: options.validate,
        },
    )?;
    if !write.success {
        tracing::warn!(
            file = %target.display(),
            backup = ?write.backup_path,
            "merged document failed validation; original restored"
        );
        return Ok(MergeResult {
            success: false,
            skipped: false,
            created: false,
            backup_path: write.backup_path,
            human_content_hash: expected_hash,
            rolled_back: write.rolled_back,
        });
    }

    verify_human_content(target, &expected_fingerprint, write.backup_path.as_deref())?;
    tracing::info!(
        file = %target.display(),
        backup = ?write.backup_path,
        human_content_hash = %expected_hash,
        "merged embedded sections"
    );
    Ok(MergeResult {
        success: true,
        skipped: false,
        created: false,
        backup_path: write.backup_path,
        human_content_hash: expected_hash,
        rolled_back: false,
    })
}

/// Hash of human content with the engine-inserted separator line removed.
/// The separator sits outside the sections, so it shows up in the human
/// content of every merged document but is not authored by a human.
pub(crate) fn human_fingerprint(human_content: &str) -> String {
    let trimmed = human_content.trim();
    let without = match trimmed.strip_suffix(SEPARATOR) {
        Some(rest) if rest.is_empty() || rest.ends_with('\n') => rest.trim_end(),
        _ => trimmed,
    };
    content_hash(without)
}

fn verify_human_content(target: &Path, expected: &str, backup: Option<&Path>) -> Result<()> {
    let written = fs::read_to_string(target)
        .map_err(|err| classify_io_error("re-read target", target, err))?;
    let actual = human_fingerprint(&split_document(&written)?.human_content);
    if actual == expected {
        return Ok(());
    }
    tracing::error!(
        file = %target.display(),
        expected,
        actual = %actual,
        backup = ?backup,
        "human content changed during merge"
    );
    Err(EmbedError::HumanContentChanged {
        target: target.to_path_buf(),
        backup: backup.map(Path::to_path_buf),
        expected: expected.to_string(),
        actual,
    })
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
