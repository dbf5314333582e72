//! Heading depth normalization for embedded snippet content.
//!
//! Snippet headings are pushed below the item heading so they can never end a
//! section or be read back as a separate item. Fenced code is left untouched.
use super::{ITEM_DEPTH, MAX_HEADING_DEPTH};

/// Depth of an ATX heading line (`### x` -> 3), or `None` for other lines.
pub fn heading_depth(line: &str) -> Option<usize> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > MAX_HEADING_DEPTH {
        return None;
    }
    match line[hashes..].chars().next() {
        None => Some(hashes),
        Some(ch) if ch == ' ' || ch == '\t' || ch == '\r' => Some(hashes),
        Some(_) => None,
    }
}

/// Move every heading one level deeper, floored just below item depth and
/// capped at the deepest representable level.
///
/// The floor is required: a bare `depth + 1` turns `# X` into `## X`, which
/// ends the section, and `## X` into `### X`, which reads back as an item.
pub fn shift_headings(content: &str) -> String {
    rewrite_headings(content, |depth| {
        (depth + 1).clamp(ITEM_DEPTH + 1, MAX_HEADING_DEPTH)
    })
}

/// Move every heading one level up (never above depth one). Inverse of
/// [`shift_headings`] for content that was already shifted.
pub fn unshift_headings(content: &str) -> String {
    rewrite_headings(content, |depth| depth.saturating_sub(1).max(1))
}

fn rewrite_headings(content: &str, new_depth: impl Fn(usize) -> usize) -> String {
    if content.trim().is_empty() {
        return content.to_string();
    }
    let mut fence: Option<(char, usize)> = None;
    let mut out = Vec::new();
    for line in content.split('\n') {
        if let Some(marker) = fence_marker(line) {
            fence = match fence {
                None => Some(marker),
                Some(open) if open.0 == marker.0 && marker.1 >= open.1 => None,
                Some(open) => Some(open),
            };
            out.push(line.to_string());
            continue;
        }
        match (fence, heading_depth(line)) {
            (None, Some(depth)) => {
                let depth_after = new_depth(depth);
                out.push(format!("{}{}", "#".repeat(depth_after), &line[depth..]));
            }
            _ => out.push(line.to_string()),
        }
    }
    out.join("\n")
}

/// Fence character and run length when `line` opens or closes a code fence.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let run = trimmed.chars().take_while(|c| *c == ch).count();
    (run >= 3).then_some((ch, run))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_depth_requires_space_after_hashes() {
        assert_eq!(heading_depth("# Title"), Some(1));
        assert_eq!(heading_depth("###### deep"), Some(6));
        assert_eq!(heading_depth("####### too deep"), None);
        assert_eq!(heading_depth("#hashtag"), None);
        assert_eq!(heading_depth("##"), Some(2));
        assert_eq!(heading_depth("plain"), None);
    }

    #[test]
    fn shift_moves_headings_below_item_depth() {
        let shifted = shift_headings("# Top\n\ntext\n\n## Sub\n\n### Third\n\n##### Fifth");
        assert_eq!(
            shifted,
            "#### Top\n\ntext\n\n#### Sub\n\n#### Third\n\n###### Fifth"
        );
    }

    #[test]
    fn shift_caps_at_max_depth() {
        assert_eq!(shift_headings("###### Six"), "###### Six");
    }

    #[test]
    fn fenced_code_is_not_rewritten() {
        let content = "```bash\n# install deps\nmake\n```\n# Real";
        assert_eq!(
            shift_headings(content),
            "```bash\n# install deps\nmake\n```\n#### Real"
        );
    }

    #[test]
    fn unshift_then_shift_is_stable_for_generated_content() {
        let generated = shift_headings("# A\n## B\n#### D\n###### F\ntext");
        assert_eq!(shift_headings(&unshift_headings(&generated)), generated);
    }

    #[test]
    fn content_without_headings_is_unchanged() {
        assert_eq!(shift_headings("just text\nmore"), "just text\nmore");
        assert_eq!(shift_headings("   "), "   ");
    }
}
