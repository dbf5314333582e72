//! End-to-end merge behavior against real files.

mod common;

use agent_embed::embedding::{
    embedded_items, merge_embedded_content, split_document, unembed, MergeOptions, SectionKind,
    UnembedOptions,
};
use agent_embed::records::RecordSet;
use agent_embed::safety::discover_backups;
use common::{command, records, skill, Workspace};

fn merge(ws: &Workspace, records: &RecordSet) -> agent_embed::embedding::MergeResult {
    merge_embedded_content(&MergeOptions {
        target_path: &ws.target(),
        records,
        backup_dir: &ws.backups(),
        validate: true,
    })
    .expect("merge")
}

#[test]
fn first_run_creates_document_with_both_sections() {
    let ws = Workspace::new();
    let set = records(
        vec![skill("review", "Check the diff."), skill("plan", "Think first.")],
        vec![command("test", "Run `cargo test`.")],
    );

    let result = merge(&ws, &set);
    assert!(result.created);
    assert!(result.backup_path.is_none());

    let doc = ws.read("CLAUDE.md");
    let split = split_document(&doc).expect("split");
    assert_eq!(
        split.sections.keys().copied().collect::<Vec<_>>(),
        vec![SectionKind::Skills, SectionKind::Commands]
    );
    let names: Vec<String> = embedded_items(&doc)
        .expect("items")
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, vec!["review", "plan", "test"]);
}

#[test]
fn snippet_with_top_level_headings_stays_inside_its_section() {
    let ws = Workspace::new();
    ws.write("CLAUDE.md", "# Project\n\nNotes.\n");
    let set = records(
        vec![skill("guide", "# Guide\n\n## Details\n\nText.\n\n### Deeper\n\nMore.")],
        vec![command("ship", "Deploy.")],
    );

    merge(&ws, &set);
    let doc = ws.read("CLAUDE.md");
    let items = embedded_items(&doc).expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "guide");
    assert_eq!(
        items[0].content,
        "#### Guide\n\n#### Details\n\nText.\n\n#### Deeper\n\nMore."
    );

    // Running again with the same records must be a no-op.
    assert!(merge(&ws, &set).skipped);
}

#[test]
fn repeated_updates_keep_human_content_and_leave_one_backup_each() {
    let ws = Workspace::new();
    let human = "# Team Rules\n\nBe kind.\n\n## Release\n\nTag it.";
    ws.write("CLAUDE.md", &format!("{human}\n"));

    merge(&ws, &records(vec![skill("a", "one")], Vec::new()));
    merge(&ws, &records(vec![skill("a", "two")], Vec::new()));
    merge(&ws, &records(vec![skill("a", "two")], Vec::new()));

    let doc = ws.read("CLAUDE.md");
    assert!(doc.starts_with(human));
    assert!(doc.contains("two"));
    assert!(!doc.contains("one"));
    assert_eq!(doc.matches("---").count(), 1);
    let backups = discover_backups(&ws.backups(), "CLAUDE.md").expect("discover");
    assert_eq!(backups.len(), 2);
}

#[test]
fn unembed_then_embed_restores_the_same_document() {
    let ws = Workspace::new();
    ws.write("CLAUDE.md", "# Notes\n");
    let full = records(
        vec![skill("keep", "Stay."), skill("drop", "Go away.")],
        vec![command("build", "make")],
    );
    merge(&ws, &full);
    let before = ws.read("CLAUDE.md");

    let result = unembed(&UnembedOptions {
        target: &ws.target(),
        remove_skills: &["drop".to_string()],
        remove_commands: &[],
        backup_dir: &ws.backups(),
        validate: true,
    })
    .expect("unembed");
    assert_eq!(result.removed.len(), 1);
    assert!(!ws.read("CLAUDE.md").contains("### drop"));

    merge(&ws, &full);
    assert_eq!(ws.read("CLAUDE.md"), before);
}

#[test]
fn lowercase_marker_is_recognized_and_regenerated() {
    let ws = Workspace::new();
    ws.write(
        "CLAUDE.md",
        "# Doc\n\n## skills  \n\n### stale\n\nold\n\n## After\n\nKeep.\n",
    );
    merge(&ws, &records(vec![skill("fresh", "new")], Vec::new()));

    let doc = ws.read("CLAUDE.md");
    assert!(!doc.contains("stale"));
    assert!(doc.contains("## After\n\nKeep."));
    assert_eq!(doc.to_lowercase().matches("## skills").count(), 1);
}
