use super::{
    merge_embedded_content, parse_embedded_items, split_document, EmbeddedItem, MergeOptions,
    MergeResult, SectionKind,
};
use crate::error::Result;
use crate::records::RecordSet;
use crate::safety::classify_io_error;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct UnembedOptions<'a> {
    pub target: &'a Path,
    /// Skill names to drop from the SKILLS section.
    pub remove_skills: &'a [String],
    /// Command names to drop from the COMMANDS section.
    pub remove_commands: &'a [String],
    pub backup_dir: &'a Path,
    pub validate: bool,
}

/// Items of a document split into the ones that stay and the ones to drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnembedPlan {
    pub removed: Vec<EmbeddedItem>,
    /// Requested names with no matching item, as `SECTION/name`.
    pub not_found: Vec<String>,
    /// Records that will be regenerated into the document.
    #[serde(skip)]
    pub remaining: RecordSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnembedResult {
    pub removed: Vec<EmbeddedItem>,
    pub not_found: Vec<String>,
    /// `None` when nothing matched and the document was left alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeResult>,
}

/// Every item currently embedded in `document`, skills first.
pub fn embedded_items(document: &str) -> Result<Vec<EmbeddedItem>> {
    let split = split_document(document)?;
    let mut items = Vec::new();
    for kind in SectionKind::ALL {
        if let Some(section) = split.section(kind) {
            items.extend(parse_embedded_items(kind, section));
        }
    }
    Ok(items)
}

/// Decide which items of `document` to drop.
pub fn plan_unembed(
    document: &str,
    remove_skills: &[String],
    remove_commands: &[String],
) -> Result<UnembedPlan> {
    let mut removed = Vec::new();
    let mut remaining = RecordSet::default();
    for item in embedded_items(document)? {
        let wanted = match item.section {
            SectionKind::Skills => remove_skills,
            SectionKind::Commands => remove_commands,
        };
        if wanted.iter().any(|name| name == &item.name) {
            removed.push(item);
            continue;
        }
        match item.section {
            SectionKind::Skills => remaining.skills.push(item.to_skill_record()),
            SectionKind::Commands => remaining.commands.push(item.to_command_record()),
        }
    }

    let mut not_found = Vec::new();
    for (kind, names) in [
        (SectionKind::Skills, remove_skills),
        (SectionKind::Commands, remove_commands),
    ] {
        for name in names {
            let matched = removed
                .iter()
                .any(|item| item.section == kind && &item.name == name);
            if !matched {
                not_found.push(format!("{kind}/{name}"));
            }
        }
    }
    Ok(UnembedPlan {
        removed,
        not_found,
        remaining,
    })
}

/// Remove the named items from the target and regenerate what is left
/// through the regular merge, so the write carries the same guarantees.
pub fn unembed(options: &UnembedOptions<'_>) -> Result<UnembedResult> {
    let document = fs::read_to_string(options.target)
        .map_err(|err| classify_io_error("read target", options.target, err))?;
    let plan = plan_unembed(&document, options.remove_skills, options.remove_commands)?;
    for name in &plan.not_found {
        tracing::warn!(file = %options.target.display(), item = %name, "no embedded item with that name");
    }
    if plan.removed.is_empty() {
        return Ok(UnembedResult {
            removed: plan.removed,
            not_found: plan.not_found,
            merge: None,
        });
    }

    let merge = merge_embedded_content(&MergeOptions {
        target_path: options.target,
        records: &plan.remaining,
        backup_dir: options.backup_dir,
        validate: options.validate,
    })?;
    tracing::info!(
        file = %options.target.display(),
        removed = plan.removed.len(),
        "removed embedded items"
    );
    Ok(UnembedResult {
        removed: plan.removed,
        not_found: plan.not_found,
        merge: Some(merge),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{generate_sections, plan_merge, split_document};
    use crate::records::{CommandRecord, Location, SkillRecord};

    const DOC: &str = "# Guide\n\nMine.\n\n---\n\n## SKILLS\n\n### review\n\nRead it.\n\n#### Checklist\n\n- tests\n\n### refactor\n\nSmall steps.\n\n## COMMANDS\n\n### deploy\n\nShip.";

    fn names(items: &[EmbeddedItem]) -> Vec<&str> {
        items.iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn lists_items_from_both_sections() {
        let items = embedded_items(DOC).expect("items");
        assert_eq!(names(&items), vec!["review", "refactor", "deploy"]);
    }

    #[test]
    fn plan_separates_removed_and_unknown_names() {
        let plan = plan_unembed(
            DOC,
            &["refactor".to_string(), "missing".to_string()],
            &["review".to_string()],
        )
        .expect("plan");
        assert_eq!(names(&plan.removed), vec!["refactor"]);
        assert_eq!(plan.not_found, vec!["SKILLS/missing", "COMMANDS/review"]);
        assert_eq!(plan.remaining.skills.len(), 1);
        assert_eq!(plan.remaining.commands.len(), 1);
    }

    #[test]
    fn regenerating_remaining_items_reproduces_their_sections() {
        let plan = plan_unembed(DOC, &[], &[]).expect("plan");
        let sections = generate_sections(&plan.remaining);
        let split = split_document(DOC).expect("split");
        for kind in SectionKind::ALL {
            assert_eq!(
                sections.get(&kind).map(String::as_str),
                split.section(kind).map(str::trim_end)
            );
        }
    }

    #[test]
    fn unembed_rewrites_target_without_removed_items() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let target = dir.path().join("CLAUDE.md");
        let backups = dir.path().join("backups");
        fs::write(&target, DOC).expect("seed");
        let skills = vec!["review".to_string()];

        let result = unembed(&UnembedOptions {
            target: &target,
            remove_skills: &skills,
            remove_commands: &[],
            backup_dir: &backups,
            validate: true,
        })
        .expect("unembed");
        let merge = result.merge.expect("merge ran");
        assert!(merge.success);
        assert!(merge.backup_path.is_some());

        let written = fs::read_to_string(&target).expect("read");
        assert!(!written.contains("### review"));
        assert!(written.contains("### refactor"));
        assert!(written.contains("### deploy"));
        assert!(written.starts_with("# Guide\n\nMine.\n\n---"));
    }

    #[test]
    fn unembed_without_matches_leaves_file_alone() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let target = dir.path().join("CLAUDE.md");
        fs::write(&target, DOC).expect("seed");
        let skills = vec!["nope".to_string()];
        let result = unembed(&UnembedOptions {
            target: &target,
            remove_skills: &skills,
            remove_commands: &[],
            backup_dir: &dir.path().join("backups"),
            validate: true,
        })
        .expect("unembed");
        assert!(result.merge.is_none());
        assert_eq!(fs::read_to_string(&target).expect("read"), DOC);
        assert!(!dir.path().join("backups").exists());
    }

    #[test]
    fn removing_every_item_drops_both_sections() {
        let records = RecordSet {
            skills: vec![SkillRecord::new("only", "x", Location::Global)],
            commands: vec![CommandRecord::new("one", "y")],
        };
        let dir = tempfile::tempdir().expect("create temp dir");
        let target = dir.path().join("CLAUDE.md");
        fs::write(&target, "# Keep\n").expect("seed");
        let seeded = plan_merge(&target, &records).expect("plan");
        fs::write(&target, &seeded.merged_content).expect("seed merged");

        let skills = vec!["only".to_string()];
        let commands = vec!["one".to_string()];
        unembed(&UnembedOptions {
            target: &target,
            remove_skills: &skills,
            remove_commands: &commands,
            backup_dir: &dir.path().join("backups"),
            validate: true,
        })
        .expect("unembed");
        let split = split_document(&fs::read_to_string(&target).expect("read")).expect("split");
        assert!(!split.has_sections);
        assert_eq!(split.human_content, "# Keep\n\n---");
    }
}
