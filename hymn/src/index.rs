//! Turn a numbered bilingual hymn index into `.hymn` sheets.
//!
//! An index lists each hymn twice: a `NNN <Chinese title>` header followed by
//! the Chinese stanzas, then a `NNN <English title>` header followed by the
//! English stanzas. Stanzas start with their number (`1 Amazing grace...`);
//! choruses start with a chorus token. Index files scraped from hymnals carry
//! meter lines, hymnal banners, and repeated stanza headings, which
//! [`sanitize_index`] removes before [`generate`] reads the entries.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::heading::Language;
use crate::reflow::{DEFAULT_MAX_LINES, collapse_lines};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})\s+(.+)$").expect("header pattern is valid"));
static HEADER_METER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\d+(?:\.\d+)+.*$").expect("meter suffix pattern is valid"));
static METER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+(?:\.\d+)*(?:\.\s*[A-Za-z\x{4e00}-\x{9fff}().\-]+)?\.?\s*$")
        .expect("meter pattern is valid")
});
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(.*)$").expect("numbered pattern is valid"));
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\b").expect("leading number pattern is valid"));
static TRAILING_STANZA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\s+.+)$").expect("stanza fragment pattern is valid"));
static EMBEDDED_STANZA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\s+(.+)$").expect("embedded stanza pattern is valid"));
static TITLE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\d.*$").expect("title tail pattern is valid"));

/// Hymnal banners that leak into scraped text.
const BANNERS: &[&str] = &["赞美和敬拜", "Praise and Worship"];
const CHORUS_TOKENS_EN: &[&str] = &["chorus", "(c)", "c)"];
const CHORUS_TOKENS_CN: &[&str] = &["和", "副歌"];
/// Part markers (special / chorus) printed on their own line.
const PART_MARKERS: &[&str] = &["特.", "和.", "特", "和"];
const SECTION_MARKERS: &[&str] = &["──", "——", "--", " — ", " - "];
const PUNCTUATION: &str = ",.;!?，。！？：；、。…“”\"'`";

pub fn has_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// Drop the meter or page numbers trailing a title.
pub fn clean_title(raw: &str) -> String {
    TITLE_TAIL.replace(raw.trim(), "").trim().to_string()
}

fn leading_ws(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// A heading with no digits and no punctuation, e.g. a stanza's short title.
fn is_plain_heading(text: &str) -> bool {
    !text
        .chars()
        .any(|c| c.is_numeric() || PUNCTUATION.contains(c))
}

/// Remove a heading glued to a stanza line with a dash marker. `None` when
/// nothing but a heading is left.
fn strip_embedded_heading(text: &str) -> Option<String> {
    let Some((_, after)) = SECTION_MARKERS
        .iter()
        .find_map(|marker| text.split_once(*marker))
    else {
        return Some(text.to_string());
    };
    let after = after.trim();
    if let Some(caps) = EMBEDDED_STANZA.captures(after) {
        return Some(caps[1].trim().to_string());
    }
    if after.is_empty() || is_plain_heading(after) {
        None
    } else {
        Some(after.to_string())
    }
}

/// Clean a scraped index. Headers lose their meter, banners and meter lines go,
/// stanza headings duplicated on the next line go, and a header whose first
/// line has no number gets stanza `1`.
pub fn sanitize_index(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let next_number = |from: usize| -> Option<String> {
        let next = lines[from + 1..].iter().map(|l| l.trim()).find(|l| !l.is_empty())?;
        LEADING_NUMBER.captures(next).map(|c| c[1].to_string())
    };

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut expect_number = false;

    for (idx, &raw) in lines.iter().enumerate() {
        let mut line = raw.to_string();
        let mut stripped = raw.trim().to_string();
        if stripped.is_empty() {
            out.push(line);
            continue;
        }

        if HEADER.is_match(&stripped) {
            out.push(HEADER_METER.replace(&stripped, "").into_owned());
            expect_number = true;
            continue;
        }

        if PART_MARKERS.contains(&stripped.as_str()) || METER.is_match(&stripped) {
            continue;
        }

        if BANNERS.iter().any(|b| stripped.contains(b)) {
            if let Some(fragment) = TRAILING_STANZA.captures(&stripped) {
                out.push(format!("{}{}", leading_ws(raw), &fragment[1]));
                expect_number = false;
            }
            continue;
        }

        if let Some(caps) = NUMBERED.captures(&stripped) {
            let number = caps[1].to_string();
            let mut rest = caps[2].to_string();
            let Some(heading) = strip_embedded_heading(&rest) else {
                continue;
            };
            if heading != rest {
                line = format!("{}{} {}", leading_ws(raw), number, heading);
                stripped = line.trim().to_string();
                rest = heading;
            }
            if next_number(idx).as_deref() == Some(number.as_str()) && is_plain_heading(&rest) {
                continue;
            }
        }

        let starts_with_digit = stripped.chars().next().is_some_and(|c| c.is_numeric());
        if expect_number && !starts_with_digit {
            out.push(format!("{}1 {}", leading_ws(&line), stripped));
            expect_number = false;
            continue;
        }
        if starts_with_digit {
            expect_number = false;
        }
        out.push(line);
    }

    let mut result = out.join("\n").trim_end().to_string();
    result.push('\n');
    result
}

/// A stanza or chorus read from one language's block of an index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSection {
    pub is_chorus: bool,
    /// Stanza number; `C` for a chorus.
    pub label: String,
    pub lines: Vec<String>,
}

impl IndexSection {
    fn new(is_chorus: bool, label: &str, first: &str) -> Self {
        IndexSection {
            is_chorus,
            label: label.to_string(),
            lines: if first.is_empty() { Vec::new() } else { vec![first.to_string()] },
        }
    }

    /// Heading base as the parser expects it: `Chorus` or `Verse N`.
    pub fn heading(&self) -> String {
        if self.is_chorus {
            "Chorus".to_string()
        } else {
            format!("Verse {}", self.label)
        }
    }
}

/// Text after `token` when `line` starts with it, ASCII case-insensitively.
fn after_token<'a>(line: &'a str, token: &str) -> Option<&'a str> {
    let head = line.get(..token.len())?;
    head.eq_ignore_ascii_case(token).then(|| &line[token.len()..])
}

/// Split one language's lines into stanzas and choruses, each collapsed to
/// the projection line budget.
pub fn parse_block<S: AsRef<str>>(lines: &[S], language: Language) -> Vec<IndexSection> {
    let mut sections: Vec<IndexSection> = Vec::new();

    for raw in lines {
        let stripped = raw.as_ref().trim();
        if stripped.is_empty() || BANNERS.iter().any(|b| stripped.contains(b)) {
            continue;
        }

        let chorus_rest = match language {
            Language::English => CHORUS_TOKENS_EN
                .iter()
                .find_map(|t| after_token(stripped, t))
                .map(|rest| rest.trim_start_matches([' ', ':', '.', '-'])),
            Language::Chinese => CHORUS_TOKENS_CN
                .iter()
                .find_map(|t| stripped.strip_prefix(t))
                .map(|rest| rest.trim_start_matches([' ', '：', ':'])),
        };
        if let Some(rest) = chorus_rest {
            sections.push(IndexSection::new(true, "C", rest));
            continue;
        }

        if let Some(caps) = NUMBERED.captures(stripped) {
            sections.push(IndexSection::new(false, &caps[1], caps[2].trim()));
            continue;
        }

        match sections.last_mut() {
            Some(section) => section.lines.push(stripped.to_string()),
            None => sections.push(IndexSection::new(false, "1", stripped)),
        }
    }

    for section in &mut sections {
        section.lines = collapse_lines(&section.lines[..], language, DEFAULT_MAX_LINES);
    }
    sections
}

/// One hymn's two halves, as found in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub number: String,
    pub title_cn: String,
    pub title_en: String,
    pub cn_lines: Vec<String>,
    pub en_lines: Vec<String>,
}

/// Pair each Chinese header with the English header that follows its block.
pub fn split_entries(text: &str) -> Vec<IndexEntry> {
    let lines: Vec<&str> = text.lines().collect();
    let header = |i: usize| HEADER.captures(lines[i].trim());
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(cn) = header(i).filter(|c| has_cjk(&c[2])) else {
            i += 1;
            continue;
        };
        let number = cn[1].to_string();
        let title_cn = cn[2].trim().to_string();
        i += 1;

        let cn_start = i;
        while i < lines.len() && header(i).is_none() {
            i += 1;
        }
        let cn_lines = lines[cn_start..i].iter().map(|l| l.to_string()).collect();
        let Some(en) = (i < lines.len()).then(|| header(i)).flatten() else {
            break;
        };
        let title_en = en[2].trim().to_string();
        i += 1;

        let en_start = i;
        while i < lines.len() && !header(i).is_some_and(|c| has_cjk(&c[2])) {
            i += 1;
        }
        entries.push(IndexEntry {
            number,
            title_cn,
            title_en,
            cn_lines,
            en_lines: lines[en_start..i].iter().map(|l| l.to_string()).collect(),
        });
    }
    entries
}

/// A rendered `.hymn` sheet and the file name it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedHymn {
    pub number: String,
    pub file_name: String,
    pub content: String,
}

fn render_sections(sections: &[IndexSection], language: &str) -> String {
    let mut out = Vec::new();
    for section in sections {
        out.push(format!("{} {}:", section.heading(), language));
        out.extend(section.lines.iter().cloned());
        out.push(String::new());
    }
    out.join("\n").trim().to_string()
}

/// Render one entry as a hymn sheet.
pub fn render_entry(entry: &IndexEntry, prefix_number: bool) -> GeneratedHymn {
    let en_sections = parse_block(&entry.en_lines[..], Language::English);
    let cn_sections = parse_block(&entry.cn_lines[..], Language::Chinese);

    let mut title_en = clean_title(&entry.title_en);
    if title_en.is_empty() {
        title_en = format!("Hymn {}", entry.number);
    }
    let title_cn = clean_title(&entry.title_cn);

    let stem = if prefix_number {
        format!("{} {}", entry.number, title_en)
    } else {
        title_en.clone()
    };

    let content = format!(
        "Title: {} ({})\nCCLI: {}\n\n{}\n\n{}\n",
        title_en,
        title_cn,
        entry.number,
        render_sections(&en_sections, "English"),
        render_sections(&cn_sections, "Chinese"),
    );

    GeneratedHymn {
        number: entry.number.clone(),
        file_name: format!("{}.hymn", stem.replace(['/', '\\'], "-")),
        content,
    }
}

/// Render every entry of an already sanitized index.
pub fn generate(index: &str, prefix_number: bool) -> Vec<GeneratedHymn> {
    split_entries(index)
        .iter()
        .map(|entry| render_entry(entry, prefix_number))
        .collect()
}
