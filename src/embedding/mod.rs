//! Machine-owned sections inside a human-edited markdown document.
//!
//! Detection is a line-oriented scan rather than a markdown parse: the rest of
//! the document is arbitrary human text and must survive byte-for-byte.
use serde::{Deserialize, Serialize};
use std::fmt;

mod boundary;
mod export;
mod generate;
mod headings;
mod items;
mod merge;
mod split;
mod template;
mod unembed;

pub use boundary::{detect_section_boundary, SectionBoundary};
pub use export::{generate_export_content, write_export, EXPORT_TITLE};
pub use generate::{generate_section, generate_sections};
pub use headings::{heading_depth, shift_headings, unshift_headings};
pub use items::{parse_embedded_items, EmbeddedItem};
pub use merge::{
    assemble_document, merge_embedded_content, normalize_for_comparison, plan_merge,
    MergeOptions, MergePlan, MergeResult,
};
pub use split::{extract_human_content, split_document, LineRange, SplitResult};
pub use template::{generate_template, TemplateOptions, TEMPLATE_NOTICE, TEMPLATE_TITLE};
pub use unembed::{
    embedded_items, plan_unembed, unembed, UnembedOptions, UnembedPlan, UnembedResult,
};

/// Heading depth of a section marker (`## SKILLS`).
pub const SECTION_DEPTH: usize = 2;
/// Heading depth of an item inside a section (`### name`).
pub const ITEM_DEPTH: usize = 3;
/// Deepest representable markdown heading.
pub const MAX_HEADING_DEPTH: usize = 6;
/// Line inserted between human content and the generated sections.
pub const SEPARATOR: &str = "---";

/// The two reserved machine-owned sections.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Skills,
    Commands,
}

impl SectionKind {
    /// All sections in the order they are emitted.
    pub const ALL: [SectionKind; 2] = [SectionKind::Skills, SectionKind::Commands];

    /// Heading label used in the document.
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Skills => "SKILLS",
            SectionKind::Commands => "COMMANDS",
        }
    }

    /// Only skills carry a location tag on their item headings.
    pub fn has_location(&self) -> bool {
        matches!(self, SectionKind::Skills)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
