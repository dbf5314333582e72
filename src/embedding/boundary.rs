use super::SectionKind;
use regex::Regex;
use std::sync::OnceLock;

/// Location of one machine-owned section within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBoundary {
    pub section: SectionKind,
    /// 0-indexed line of the section heading.
    pub start_line: usize,
    /// Exclusive end: the next terminating heading, or the line count.
    pub end_line: usize,
    /// Raw section text including the heading line.
    pub content: String,
}

fn section_heading(section: SectionKind) -> &'static Regex {
    static SKILLS: OnceLock<Regex> = OnceLock::new();
    static COMMANDS: OnceLock<Regex> = OnceLock::new();
    let cell = match section {
        SectionKind::Skills => &SKILLS,
        SectionKind::Commands => &COMMANDS,
    };
    cell.get_or_init(|| {
        Regex::new(&format!(r"(?i)^##\s+{}\s*$", section.label()))
            .expect("section heading regex is valid")
    })
}

/// Any heading at section depth or shallower ends a section.
fn terminating_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{1,2}\s+").expect("terminating heading regex is valid"))
}

/// Locate a named section in `document`.
///
/// The first heading line that is exactly `## <LABEL>` (case-insensitive,
/// trailing whitespace allowed) starts the section. It runs until the next
/// heading of depth two or less; item and subsection headings do not end it.
pub fn detect_section_boundary(document: &str, section: SectionKind) -> Option<SectionBoundary> {
    let lines: Vec<&str> = document.split('\n').collect();
    let start_pattern = section_heading(section);
    let start_line = lines.iter().position(|line| start_pattern.is_match(line))?;

    let end_pattern = terminating_heading();
    let end_line = lines
        .iter()
        .enumerate()
        .skip(start_line + 1)
        .find(|(_, line)| end_pattern.is_match(line))
        .map(|(idx, _)| idx)
        .unwrap_or(lines.len());

    tracing::debug!(%section, start_line, end_line, "detected section");
    Some(SectionBoundary {
        section,
        start_line,
        end_line,
        content: lines[start_line..end_line].join("\n"),
    })
}
