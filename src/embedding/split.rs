use super::{detect_section_boundary, SectionKind};
use crate::error::{EmbedError, Result};
use crate::util::content_hash;
use std::collections::BTreeMap;

/// Half-open line range `[start, end)` owned by one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub section: SectionKind,
    pub start: usize,
    pub end: usize,
}

/// A document separated into human content and machine-owned sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    /// Everything outside the detected sections, trimmed.
    pub human_content: String,
    /// Fingerprint of `human_content`; compared before and after every write.
    pub human_content_hash: String,
    /// Original section text (heading included) per detected section.
    pub sections: BTreeMap<SectionKind, String>,
    pub has_sections: bool,
}

impl SplitResult {
    fn empty() -> Self {
        Self {
            human_content: String::new(),
            human_content_hash: content_hash(""),
            sections: BTreeMap::new(),
            has_sections: false,
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&str> {
        self.sections.get(&kind).map(String::as_str)
    }
}

/// Split `document` into human content and the reserved sections.
///
/// Overlapping section ranges cannot come from the two reserved labels today,
/// but are rejected rather than silently mis-split.
pub fn split_document(document: &str) -> Result<SplitResult> {
    if document.trim().is_empty() {
        return Ok(SplitResult::empty());
    }

    let mut sections = BTreeMap::new();
    let mut ranges = Vec::new();
    for kind in SectionKind::ALL {
        if let Some(boundary) = detect_section_boundary(document, kind) {
            ranges.push(LineRange {
                section: kind,
                start: boundary.start_line,
                end: boundary.end_line,
            });
            sections.insert(kind, boundary.content);
        }
    }

    let human_content = extract_human_content(document, &ranges)?;
    let human_content_hash = content_hash(&human_content);
    Ok(SplitResult {
        human_content,
        human_content_hash,
        has_sections: !sections.is_empty(),
        sections,
    })
}

/// Remove `ranges` from `document` and return the remaining lines, trimmed.
/// Ranges may be given in any order.
pub fn extract_human_content(document: &str, ranges: &[LineRange]) -> Result<String> {
    let lines: Vec<&str> = document.split('\n').collect();
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|range| (range.start, range.end));

    for pair in sorted.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        if second.start < first.end {
            return Err(EmbedError::OverlappingSections {
                first: first.section,
                second: second.section,
                first_range: (first.start, first.end),
                second_range: (second.start, second.end),
            });
        }
    }

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut cursor = 0;
    for range in &sorted {
        let start = range.start.min(lines.len());
        kept.extend_from_slice(&lines[cursor.min(start)..start]);
        cursor = range.end.min(lines.len());
    }
    if cursor < lines.len() {
        kept.extend_from_slice(&lines[cursor..]);
    }
    Ok(kept.join("\n").trim().to_string())
}
