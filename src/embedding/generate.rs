use super::{shift_headings, SectionKind};
use crate::records::{RecordSet, Snippet};
use std::collections::BTreeMap;

/// Render one section from its records.
///
/// Returns an empty string when `records` is empty; callers omit empty
/// sections instead of emitting a bare heading.
pub fn generate_section<S: Snippet>(section: SectionKind, records: &[S]) -> String {
    if records.is_empty() {
        return String::new();
    }
    let mut out = format!("## {}\n\n", section.label());
    for record in records {
        out.push_str(&format!("### {}\n\n", record.name().trim()));
        out.push_str(&shift_headings(record.content().trim()));
        out.push_str("\n\n");
    }
    out.truncate(out.trim_end().len());
    out
}

/// Render every non-empty section of a record set.
pub fn generate_sections(records: &RecordSet) -> BTreeMap<SectionKind, String> {
    let mut sections = BTreeMap::new();
    let skills = generate_section(SectionKind::Skills, &records.skills);
    if !skills.is_empty() {
        sections.insert(SectionKind::Skills, skills);
    }
    let commands = generate_section(SectionKind::Commands, &records.commands);
    if !commands.is_empty() {
        sections.insert(SectionKind::Commands, commands);
    }
    sections
}
