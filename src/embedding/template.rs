use super::SectionKind;

/// Title of a freshly synthesized target document.
pub const TEMPLATE_TITLE: &str = "# Project Instructions";

/// Comment placed under the title of a synthesized document.
pub const TEMPLATE_NOTICE: &str = "<!-- The SKILLS and COMMANDS sections below are generated by agent-embed and are rewritten on every run. Everything outside them is yours to edit. -->";

/// Which empty sections to seed a new document with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateOptions {
    pub include_skills: bool,
    pub include_commands: bool,
}

/// Minimal document used when the target does not exist yet.
pub fn generate_template(options: TemplateOptions) -> String {
    let mut parts = vec![TEMPLATE_TITLE.to_string(), TEMPLATE_NOTICE.to_string()];
    if options.include_skills {
        parts.push(format!("## {}", SectionKind::Skills.label()));
    }
    if options.include_commands {
        parts.push(format!("## {}", SectionKind::Commands.label()));
    }
    let mut text = parts.join("\n\n");
    text.push('\n');
    text
}
