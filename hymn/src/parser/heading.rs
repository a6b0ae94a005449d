use std::sync::LazyLock;

use regex::Regex;

use crate::verse::SectionKind;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?) (english|chinese):$").expect("heading pattern is valid")
});

const SECTION_PREFIXES: &[&str] = &["verse", "chorus", "bridge", "intro", "outro", "ending"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Chinese,
}

/// A recognized `<Base> <Language>:` line.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// Base label as written, trimmed.
    pub base: String,
    /// Lowercased, whitespace-collapsed base. Groups headings into sections.
    pub base_key: String,
    pub language: Language,
    pub kind: SectionKind,
}

impl Heading {
    /// Recognize a trimmed line as a section heading.
    pub fn recognize(line: &str) -> Option<Heading> {
        let caps = HEADING.captures(line)?;
        let base = caps.get(1)?.as_str().trim();
        let lower = base.to_lowercase();
        if !SECTION_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            return None;
        }
        let language = if caps.get(2)?.as_str().eq_ignore_ascii_case("english") {
            Language::English
        } else {
            Language::Chinese
        };
        Some(Heading {
            base: base.to_string(),
            base_key: normalize_base(base),
            language,
            kind: SectionKind::detect(base),
        })
    }
}

/// Whitespace plus the byte-order mark some editors put at the start of a file.
pub fn is_padding(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Trim whitespace and byte-order marks from both ends of a line.
pub fn trim_line(line: &str) -> &str {
    line.trim_matches(is_padding)
}

/// Trim, lowercase, and collapse interior whitespace.
pub fn normalize_base(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
