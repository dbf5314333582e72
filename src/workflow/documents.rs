//! Read-only commands over a document: list, validate.
use super::print_json;
use crate::cli::{ListArgs, ValidateArgs};
use agent_embed::embedding::{embedded_items, split_document, EmbeddedItem, SectionKind};
use agent_embed::safety::validate_markdown_structure;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

fn read_target(target: &Path) -> Result<String> {
    fs::read_to_string(target).with_context(|| format!("read {}", target.display()))
}

pub(crate) fn run_list(args: &ListArgs) -> Result<()> {
    let document = read_target(&args.target)?;
    let items = embedded_items(&document)?;
    if args.json {
        return print_json(&items, "embedded items");
    }
    if items.is_empty() {
        println!("no embedded items in {}", args.target.display());
        return Ok(());
    }
    for item in &items {
        println!("{}", describe(item));
    }
    Ok(())
}

fn describe(item: &EmbeddedItem) -> String {
    match item.location {
        Some(location) => format!("{:<9} {} ({location})", item.section.label(), item.name),
        None => format!("{:<9} {}", item.section.label(), item.name),
    }
}

#[derive(Serialize)]
struct ValidateReport<'a> {
    target: &'a Path,
    valid: bool,
    errors: Vec<String>,
    sections: Vec<SectionKind>,
    items: usize,
    human_content_hash: String,
}

pub(crate) fn run_validate(args: &ValidateArgs) -> Result<()> {
    let document = read_target(&args.target)?;
    let structure = validate_markdown_structure(&document);
    let split = split_document(&document)?;
    let items = embedded_items(&document)?;
    let report = ValidateReport {
        target: &args.target,
        valid: structure.valid,
        errors: structure.errors,
        sections: split.sections.keys().copied().collect(),
        items: items.len(),
        human_content_hash: split.human_content_hash,
    };

    if args.json {
        print_json(&report, "validation report")?;
    } else {
        let sections: Vec<&str> = report.sections.iter().map(SectionKind::label).collect();
        println!("target: {}", args.target.display());
        println!(
            "sections: {}",
            if sections.is_empty() {
                "none".to_string()
            } else {
                sections.join(", ")
            }
        );
        println!("items: {}", report.items);
        println!("human content hash: {}", report.human_content_hash);
        for error in &report.errors {
            println!("error: {error}");
        }
    }

    if !report.valid {
        return Err(anyhow!("{} failed validation", args.target.display()));
    }
    Ok(())
}
