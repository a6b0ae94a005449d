use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Range;

use tracing::{debug, trace};

use crate::parser::error::{DiagnosticKind, ParseDiagnostic};
use crate::parser::heading::{Heading, Language, is_padding, trim_line};
use crate::verse::{SectionKind, Verse};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Everything the line pass recovers from a hymn sheet, before an id is assigned.
#[derive(Debug)]
pub struct Sheet {
    pub title: String,
    pub ccli_no: Option<String>,
    pub order: Vec<String>,
    pub verses: BTreeMap<String, Verse>,
}

/// Run the line pass over `source`. Non-fatal findings are returned alongside
/// the sheet; an `Err` means an internal invariant broke.
pub fn parse_sheet(
    source: &str,
    file_id: usize,
) -> Result<(Sheet, Vec<ParseDiagnostic>), ParseDiagnostic> {
    let mut state = ParseState::new(file_id);
    for (line, span) in physical_lines(source) {
        state.process_line(line, span)?;
    }
    state.finalize(source.len())
}

/// Split on `\n`, trim each line, drop empty ones. Spans cover the trimmed text.
fn physical_lines(source: &str) -> impl Iterator<Item = (&str, Range<usize>)> {
    let mut offset = 0;
    source
        .split('\n')
        .map(move |raw| {
            let start = offset;
            offset += raw.len() + 1;
            let lead = raw.len() - raw.trim_start_matches(is_padding).len();
            let trimmed = trim_line(raw);
            (trimmed, start + lead..start + lead + trimmed.len())
        })
        .filter(|(line, _)| !line.is_empty())
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct Section {
    label: String,
    base_key: String,
    kind: SectionKind,
    english: Vec<String>,
    chinese: Vec<String>,
    has_chinese: bool,
}

impl Section {
    fn new(label: &str, base_key: &str, kind: SectionKind) -> Self {
        Section {
            label: label.to_string(),
            base_key: base_key.to_string(),
            kind,
            english: Vec::new(),
            chinese: Vec::new(),
            has_chinese: false,
        }
    }

    /// EN, ZH, EN, ZH ... by line position.
    fn interleave(self) -> Verse {
        let len = self.english.len().max(self.chinese.len());
        let mut lines = Vec::with_capacity(self.english.len() + self.chinese.len());
        let mut english = self.english.into_iter();
        let mut chinese = self.chinese.into_iter();
        for _ in 0..len {
            lines.extend(english.next());
            lines.extend(chinese.next());
        }
        Verse {
            name: self.label,
            lines,
            kind: Some(self.kind),
        }
    }
}

struct ParseState {
    file_id: usize,
    title: String,
    ccli_no: Option<String>,
    in_metadata: bool,
    sections: HashMap<String, Section>,
    /// Presentation order.
    order: Vec<String>,
    /// Occurrence count per base key, for `base#N` keys.
    occurrences: HashMap<String, usize>,
    /// English sections still waiting for a Chinese block, per base key.
    awaiting: HashMap<String, VecDeque<String>>,
    active: Option<(String, Language)>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl ParseState {
    fn new(file_id: usize) -> Self {
        ParseState {
            file_id,
            title: "Untitled".to_string(),
            ccli_no: None,
            in_metadata: true,
            sections: HashMap::new(),
            order: Vec::new(),
            occurrences: HashMap::new(),
            awaiting: HashMap::new(),
            active: None,
            diagnostics: Vec::new(),
        }
    }

    fn process_line(&mut self, line: &str, span: Range<usize>) -> Result<(), ParseDiagnostic> {
        if self.in_metadata {
            if let Some(rest) = line.strip_prefix("Title:") {
                self.title = rest.trim().to_string();
                return Ok(());
            }
            if let Some(rest) = line.strip_prefix("CCLI:") {
                self.ccli_no = Some(rest.trim().to_string());
                return Ok(());
            }
        }

        match Heading::recognize(line) {
            Some(heading) => {
                self.in_metadata = false;
                self.open_section(heading, span)
            }
            None => self.push_lyric(line, span),
        }
    }

    fn push_lyric(&mut self, line: &str, span: Range<usize>) -> Result<(), ParseDiagnostic> {
        let Some((key, language)) = &self.active else {
            self.diagnostics.push(ParseDiagnostic::new(
                DiagnosticKind::StrayLine,
                span,
                self.file_id,
            ));
            return Ok(());
        };
        let section = self.sections.get_mut(key).ok_or_else(|| {
            ParseDiagnostic::internal(
                format!("active section `{}` has no record", key),
                span.clone(),
                self.file_id,
            )
        })?;
        match language {
            Language::English => section.english.push(line.to_string()),
            Language::Chinese => section.chinese.push(line.to_string()),
        }
        Ok(())
    }

    fn open_section(&mut self, heading: Heading, span: Range<usize>) -> Result<(), ParseDiagnostic> {
        match heading.language {
            Language::English => {
                let key = self.next_key(&heading.base_key);
                self.insert_section(&key, Section::new(&heading.base, &heading.base_key, heading.kind));
                self.awaiting
                    .entry(heading.base_key)
                    .or_default()
                    .push_back(key.clone());
                trace!(key = %key, "english section opened");
                self.active = Some((key, Language::English));
            }
            Language::Chinese => {
                let key = self.resolve_chinese(&heading, span.clone());
                let section = self.sections.get_mut(&key).ok_or_else(|| {
                    ParseDiagnostic::internal(
                        format!("resolved section `{}` has no record", key),
                        span,
                        self.file_id,
                    )
                })?;
                section.has_chinese = true;
                let base_key = section.base_key.clone();
                if let Some(queue) = self.awaiting.get_mut(&base_key) {
                    queue.retain(|k| *k != key);
                }
                trace!(key = %key, "chinese block attached");
                self.active = Some((key, Language::Chinese));
            }
        }
        Ok(())
    }

    /// Pick the section a Chinese heading belongs to: same-base queue, then
    /// same type, then any untranslated section, then a new section.
    fn resolve_chinese(&mut self, heading: &Heading, span: Range<usize>) -> String {
        if let Some(queue) = self.awaiting.get_mut(&heading.base_key) {
            while let Some(candidate) = queue.pop_front() {
                if self.sections.get(&candidate).is_some_and(|s| !s.has_chinese) {
                    return candidate;
                }
            }
        }

        let by_kind = self.first_untranslated(|s| s.kind == heading.kind);
        if let Some(key) = by_kind.or_else(|| self.first_untranslated(|_| true)) {
            debug!(heading = %heading.base, key = %key, "chinese block paired by fallback");
            self.diagnostics.push(ParseDiagnostic::new(
                DiagnosticKind::ReassignedChinese {
                    heading: heading.base.clone(),
                    key: key.clone(),
                },
                span,
                self.file_id,
            ));
            return key;
        }

        let derived = if heading.base_key.is_empty() {
            format!("section-{}", self.order.len() + 1)
        } else {
            heading.base_key.clone()
        };
        let key = self.next_key(&derived);
        self.insert_section(&key, Section::new(&heading.base, &derived, heading.kind));
        debug!(key = %key, "synthesized section for unpaired chinese block");
        self.diagnostics.push(ParseDiagnostic::new(
            DiagnosticKind::SynthesizedSection { key: key.clone() },
            span,
            self.file_id,
        ));
        key
    }

    fn first_untranslated(&self, matches: impl Fn(&Section) -> bool) -> Option<String> {
        self.order
            .iter()
            .find(|key| {
                self.sections
                    .get(*key)
                    .is_some_and(|s| !s.has_chinese && matches(s))
            })
            .cloned()
    }

    /// `base` for the first occurrence, `base#N` after that. Skips keys that a
    /// literal label has already claimed.
    fn next_key(&mut self, base: &str) -> String {
        let count = self.occurrences.entry(base.to_string()).or_insert(0);
        loop {
            *count += 1;
            let key = if *count == 1 {
                base.to_string()
            } else {
                format!("{}#{}", base, count)
            };
            if !self.sections.contains_key(&key) {
                return key;
            }
        }
    }

    fn insert_section(&mut self, key: &str, section: Section) {
        self.sections.insert(key.to_string(), section);
        self.order.push(key.to_string());
    }

    fn finalize(mut self, source_len: usize) -> Result<(Sheet, Vec<ParseDiagnostic>), ParseDiagnostic> {
        let mut verses = BTreeMap::new();
        for key in &self.order {
            let section = self.sections.remove(key).ok_or_else(|| {
                ParseDiagnostic::internal(
                    format!("section `{}` listed twice in presentation order", key),
                    source_len..source_len,
                    self.file_id,
                )
            })?;
            verses.insert(key.clone(), section.interleave());
        }

        let sheet = Sheet {
            title: self.title,
            ccli_no: self.ccli_no,
            order: self.order,
            verses,
        };
        Ok((sheet, self.diagnostics))
    }
}
