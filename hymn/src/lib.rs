pub mod catalog;
pub mod index;
pub mod parser;
pub mod reflow;
pub mod verse;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::parser::{ParseDiagnostic, Parser, parse};
pub use crate::verse::{SectionKind, Verse};

/// A parsed hymn, ready for segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Opaque identifier. The catalog replaces it with the file stem.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccli_no: Option<String>,
    /// Section keys in presentation order. Every key has an entry in `verses`.
    pub verse_order: Vec<String>,
    pub verses: BTreeMap<String, Verse>,
    /// Lines are already language-merged; chunk by raw line count.
    #[serde(default)]
    pub pre_interleaved: bool,
}

impl Song {
    /// Title up to the first `/`, which separates alternate-language titles
    /// in some source files.
    pub fn display_title(&self) -> &str {
        self.title.split('/').next().unwrap_or_default().trim()
    }

    /// Header line shown under the projected lyrics.
    pub fn heading(&self) -> String {
        match &self.ccli_no {
            Some(ccli) if !ccli.is_empty() => format!("{} • {}", ccli, self.display_title()),
            _ => self.display_title().to_string(),
        }
    }

    /// Verses in presentation order, skipping keys with no verse.
    pub fn ordered_verses(&self) -> impl Iterator<Item = (&str, &Verse)> {
        self.verse_order
            .iter()
            .filter_map(|key| self.verses.get(key).map(|v| (key.as_str(), v)))
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        if let Some(ccli) = &self.ccli_no {
            writeln!(f, "CCLI: {}", ccli)?;
        }
        for (key, verse) in self.ordered_verses() {
            writeln!(f)?;
            writeln!(f, "[{}] {}", key, verse.name)?;
            write!(f, "{}", verse)?;
        }
        Ok(())
    }
}
