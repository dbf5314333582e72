//! Commands that rewrite a document: embed, unembed, export.
use super::{plural, print_json, WorkflowContext};
use crate::cli::{EmbedArgs, ExportArgs, UnembedArgs};
use agent_embed::embedding::{
    merge_embedded_content, plan_merge, plan_unembed, unembed, write_export, EmbeddedItem,
    MergeOptions, MergeResult, UnembedOptions,
};
use agent_embed::records::load_records;
use agent_embed::safety::SafeWriteOptions;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct DryRunReport<'a> {
    target: &'a Path,
    created: bool,
    unchanged: bool,
    human_content_hash: &'a str,
    merged_content: &'a str,
}

#[derive(Serialize)]
struct EmbedReport<'a> {
    target: &'a Path,
    skills: usize,
    commands: usize,
    #[serde(flatten)]
    result: &'a MergeResult,
}

pub(crate) fn run_embed(ctx: &WorkflowContext, args: &EmbedArgs) -> Result<()> {
    let records = load_records(&args.records)?;
    if records.is_empty() {
        tracing::warn!(records = %args.records.display(), "record manifest is empty");
    }

    if args.dry_run {
        let plan = plan_merge(&args.target, &records)?;
        if args.json {
            return print_json(
                &DryRunReport {
                    target: &args.target,
                    created: plan.created,
                    unchanged: plan.unchanged,
                    human_content_hash: plan.human_content_hash(),
                    merged_content: &plan.merged_content,
                },
                "dry run",
            );
        }
        println!("{}", plan.merged_content);
        return Ok(());
    }

    let result = merge_embedded_content(&MergeOptions {
        target_path: &args.target,
        records: &records,
        backup_dir: &ctx.backup_dir,
        validate: ctx.config.validate && !args.no_validate,
    })?;

    if args.json {
        print_json(
            &EmbedReport {
                target: &args.target,
                skills: records.skills.len(),
                commands: records.commands.len(),
                result: &result,
            },
            "embed result",
        )?;
    } else {
        let counts = format!(
            "{}, {}",
            plural(records.skills.len(), "skill"),
            plural(records.commands.len(), "command")
        );
        if result.skipped {
            println!("unchanged {} ({counts})", args.target.display());
        } else if result.created {
            println!("created {} ({counts})", args.target.display());
        } else if result.success {
            println!("updated {} ({counts})", args.target.display());
        }
        if let Some(backup) = &result.backup_path {
            println!("backup: {}", backup.display());
        }
    }

    ensure_written(&args.target, result.success, result.backup_path.as_deref())?;
    if !result.skipped {
        ctx.after_write()?;
    }
    Ok(())
}

#[derive(Serialize)]
struct UnembedDryRun<'a> {
    target: &'a Path,
    removed: &'a [EmbeddedItem],
    not_found: &'a [String],
}

pub(crate) fn run_unembed(ctx: &WorkflowContext, args: &UnembedArgs) -> Result<()> {
    if args.skills.is_empty() && args.commands.is_empty() {
        return Err(anyhow!("nothing to remove (pass --skill or --command)"));
    }

    let (removed, not_found, merge) = if args.dry_run {
        let document = fs::read_to_string(&args.target)
            .with_context(|| format!("read {}", args.target.display()))?;
        let plan = plan_unembed(&document, &args.skills, &args.commands)?;
        if args.json {
            return print_json(
                &UnembedDryRun {
                    target: &args.target,
                    removed: &plan.removed,
                    not_found: &plan.not_found,
                },
                "unembed plan",
            );
        }
        (plan.removed, plan.not_found, None)
    } else {
        let result = unembed(&UnembedOptions {
            target: &args.target,
            remove_skills: &args.skills,
            remove_commands: &args.commands,
            backup_dir: &ctx.backup_dir,
            validate: ctx.config.validate,
        })?;
        if args.json {
            print_json(&result, "unembed result")?;
        }
        (result.removed, result.not_found, result.merge)
    };

    if !args.json {
        let verb = if args.dry_run { "would remove" } else { "removed" };
        for item in &removed {
            println!("{verb} {} {}", item.section, item.name);
        }
        for name in &not_found {
            println!("not found: {name}");
        }
        if let Some(backup) = merge.as_ref().and_then(|m| m.backup_path.as_ref()) {
            println!("backup: {}", backup.display());
        }
    }

    if removed.is_empty() {
        return Err(anyhow!(
            "no embedded items matched in {}",
            args.target.display()
        ));
    }
    if let Some(merge) = &merge {
        ensure_written(&args.target, merge.success, merge.backup_path.as_deref())?;
        ctx.after_write()?;
    }
    Ok(())
}

pub(crate) fn run_export(ctx: &WorkflowContext, args: &ExportArgs) -> Result<()> {
    let records = load_records(&args.records)?;
    let result = write_export(
        &records,
        &args.out,
        &SafeWriteOptions {
            backup_dir: &ctx.backup_dir,
            validate: ctx.config.validate,
        },
    )?;
    if result.success {
        println!(
            "exported {} and {} to {}",
            plural(records.skills.len(), "skill"),
            plural(records.commands.len(), "command"),
            args.out.display()
        );
        if let Some(backup) = &result.backup_path {
            println!("backup: {}", backup.display());
        }
        println!("include it with: @{}", args.out.display());
    }
    ensure_written(&args.out, result.success, result.backup_path.as_deref())?;
    ctx.after_write()
}

fn ensure_written(target: &Path, success: bool, backup: Option<&Path>) -> Result<()> {
    if success {
        return Ok(());
    }
    let backup = backup
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    Err(anyhow!(
        "written document failed validation; {} was rolled back (backup: {backup})",
        target.display()
    ))
}
