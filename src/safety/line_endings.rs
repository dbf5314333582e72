use serde::Serialize;

/// Line ending convention of a document.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

/// Any `\r\n` in the text marks it as CRLF.
pub fn detect_line_ending(content: &str) -> LineEnding {
    if content.contains("\r\n") {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    }
}

/// True when the text uses both `\r\n` and bare `\n` line breaks.
pub fn has_mixed_line_endings(content: &str) -> bool {
    content.contains("\r\n") && content.split("\r\n").any(|chunk| chunk.contains('\n'))
}

/// Rewrite every line break to `ending`. Mixed input is folded to LF first.
pub fn normalize_line_ending(content: &str, ending: LineEnding) -> String {
    let lf = content.replace("\r\n", "\n");
    match ending {
        LineEnding::Lf => lf,
        LineEnding::Crlf => lf.replace('\n', "\r\n"),
    }
}
