use super::{unshift_headings, SectionKind};
use crate::records::{CommandRecord, Location, SkillRecord};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// One rendered snippet read back out of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedItem {
    pub section: SectionKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Item body as it appears in the document (headings still shifted).
    pub content: String,
}

impl EmbeddedItem {
    /// Rebuild a skill record, restoring the snippet's original heading depth.
    pub fn to_skill_record(&self) -> SkillRecord {
        SkillRecord::new(
            self.name.clone(),
            unshift_headings(&self.content),
            self.location.unwrap_or_default(),
        )
    }

    /// Rebuild a command record, restoring the snippet's original heading depth.
    pub fn to_command_record(&self) -> CommandRecord {
        CommandRecord::new(self.name.clone(), unshift_headings(&self.content))
    }
}

fn item_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^###\s+(.+?)\s*$").expect("item heading regex is valid"))
}

fn location_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+?)\s+\((\w+)\)$").expect("location regex is valid"))
}

fn section_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^##\s+(SKILLS|COMMANDS)\s*$").expect("section marker regex is valid")
    })
}

/// Parse the items of one section. `section_content` is the raw section text,
/// heading line included, as returned by the splitter.
pub fn parse_embedded_items(section: SectionKind, section_content: &str) -> Vec<EmbeddedItem> {
    let mut items = Vec::new();
    let mut current: Option<(String, Option<Location>)> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in section_content.split('\n') {
        if section_marker().is_match(line) {
            continue;
        }
        let Some(caps) = item_heading().captures(line) else {
            if current.is_some() {
                body.push(line);
            }
            continue;
        };
        if let Some((name, location)) = current.take() {
            items.push(finish_item(section, name, location, &body));
        }
        body.clear();
        let heading = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        current = Some(split_location(section, heading));
    }
    if let Some((name, location)) = current {
        items.push(finish_item(section, name, location, &body));
    }
    items
}

fn split_location(section: SectionKind, heading: &str) -> (String, Option<Location>) {
    if !section.has_location() {
        return (heading.to_string(), None);
    }
    let Some(caps) = location_suffix().captures(heading) else {
        return (heading.to_string(), None);
    };
    let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let tag = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    match Location::parse(tag) {
        Some(location) => (name.to_string(), Some(location)),
        None => (heading.to_string(), None),
    }
}

fn finish_item(
    section: SectionKind,
    name: String,
    location: Option<Location>,
    body: &[&str],
) -> EmbeddedItem {
    EmbeddedItem {
        section,
        name,
        location,
        content: body.join("\n").trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_items_with_and_without_location() {
        let section = "## SKILLS\n\n### review (global)\n\nCheck it.\n\n### refactor\n\n#### Steps\n\nSmall.\n\n### odd (team)\n\nx";
        let items = parse_embedded_items(SectionKind::Skills, section);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].name, "review");
        assert_eq!(items[0].location, Some(Location::Global));
        assert_eq!(items[0].content, "Check it.");
        assert_eq!(items[1].name, "refactor");
        assert_eq!(items[1].location, None);
        assert_eq!(items[1].content, "#### Steps\n\nSmall.");
        assert_eq!(items[2].name, "odd (team)");
    }

    #[test]
    fn commands_never_split_location() {
        let items =
            parse_embedded_items(SectionKind::Commands, "## COMMANDS\n### build (project)\nmake");
        assert_eq!(items[0].name, "build (project)");
        assert_eq!(items[0].location, None);
    }

    #[test]
    fn text_before_first_item_is_ignored() {
        let items = parse_embedded_items(SectionKind::Commands, "## COMMANDS\nstray\n### a\nbody");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "body");
    }

    #[test]
    fn records_restore_original_heading_depth() {
        let item = EmbeddedItem {
            section: SectionKind::Commands,
            name: "deploy".to_string(),
            location: None,
            content: "#### Deploy\n\nrun".to_string(),
        };
        assert_eq!(item.to_command_record().content, "### Deploy\n\nrun");
    }
}
