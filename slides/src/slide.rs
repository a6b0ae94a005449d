use std::fmt;

use serde::{Deserialize, Serialize};

/// Rendering hint for the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutHint {
    /// More lines than the normal slide budget; render smaller or tighter.
    Dense,
}

/// One projected screen of lyrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Verse label, with an `a`, `b`, ... suffix when the verse spans several slides.
    pub label: String,
    pub lines: Vec<String>,
    /// Digits from the verse label, or `C` for a chorus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stanza_number: Option<String>,
    /// 1-based ordinal among non-chorus verses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stanza_index: Option<usize>,
    pub is_chorus: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hint: Option<LayoutHint>,
}

impl Slide {
    pub fn is_dense(&self) -> bool {
        self.layout_hint == Some(LayoutHint::Dense)
    }
}

impl fmt::Display for Slide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label)?;
        if self.is_dense() {
            write!(f, " (dense)")?;
        }
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}
