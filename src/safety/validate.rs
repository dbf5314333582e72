use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn any_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#{1,6}\s+.+$").expect("heading regex is valid"))
}

/// Minimal structural check run after every write: the document must not be
/// blank and must contain at least one markdown heading. It only catches
/// clearly broken output.
pub fn validate_markdown_structure(content: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if content.trim().is_empty() {
        errors.push("Content is empty".to_string());
    }
    if !any_heading().is_match(content) {
        errors.push("Missing markdown headings".to_string());
    }
    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_reports_both_problems() {
        let result = validate_markdown_structure("  \n");
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Content is empty", "Missing markdown headings"]);
    }

    #[test]
    fn prose_without_headings_is_invalid() {
        let result = validate_markdown_structure("just words\n#nospace\n");
        assert_eq!(result.errors, vec!["Missing markdown headings"]);
    }

    #[test]
    fn any_heading_depth_passes() {
        assert!(validate_markdown_structure("intro\n###### deep\n").valid);
        assert!(validate_markdown_structure("# Title").valid);
        assert!(!validate_markdown_structure("####### too deep").valid);
    }
}
