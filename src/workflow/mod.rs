//! Command runners behind the CLI.
//!
//! Each runner loads its inputs, calls one library operation, and reports
//! the outcome; none of them make decisions about document content.
mod backups;
mod context;
mod documents;
mod embed;

pub(crate) use backups::{run_backups, run_cleanup, run_restore};
pub(crate) use context::WorkflowContext;
pub(crate) use documents::{run_list, run_validate};
pub(crate) use embed::{run_embed, run_export, run_unembed};

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

fn print_json<T: Serialize>(value: &T, what: &str) -> Result<()> {
    let text = serde_json::to_string_pretty(value).with_context(|| format!("serialize {what}"))?;
    println!("{text}");
    Ok(())
}

fn target_file_name(target: &Path) -> Result<&str> {
    target
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("target {} has no usable file name", target.display()))
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}
