use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of a section, derived from its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Verse,
    Chorus,
    /// Bridge, intro, outro, ending.
    Other,
}

impl SectionKind {
    /// Classify a base label such as "Verse 2" or "Chorus".
    pub fn detect(base: &str) -> Self {
        let lower = base.to_lowercase();
        if lower.starts_with("verse") {
            SectionKind::Verse
        } else if lower.starts_with("chorus") {
            SectionKind::Chorus
        } else {
            SectionKind::Other
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Verse => write!(f, "verse"),
            SectionKind::Chorus => write!(f, "chorus"),
            SectionKind::Other => write!(f, "other"),
        }
    }
}

/// One disambiguated section of a song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// Display label, as written in the first heading that opened the section.
    pub name: String,
    /// Language-interleaved lines. Never reordered after parsing.
    pub lines: Vec<String>,
    /// Absent on songs from sources that carry no section metadata.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
}

impl Verse {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Verse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}
