pub mod error;
pub mod heading;
mod structural;

pub use error::{DiagnosticKind, ParseDiagnostic};

use tracing::warn;
use uuid::Uuid;

use crate::Song;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
    fixed_id: Option<String>,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            fixed_id: None,
        }
    }

    /// Use `id` for the song instead of a freshly generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.fixed_id = Some(id.into());
        self
    }

    /// Parse the hymn sheet, discarding diagnostics.
    pub fn parse(&self) -> Option<Song> {
        self.parse_with_diagnostics().0
    }

    /// Parse the hymn sheet. The song is `None` only when an internal
    /// invariant failed, and the diagnostics then hold just that failure.
    pub fn parse_with_diagnostics(&self) -> (Option<Song>, Vec<ParseDiagnostic>) {
        match structural::parse_sheet(&self.source, self.file_id) {
            Ok((sheet, diagnostics)) => {
                let id = self
                    .fixed_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
                let song = Song {
                    id,
                    title: sheet.title,
                    ccli_no: sheet.ccli_no,
                    verse_order: sheet.order,
                    verses: sheet.verses,
                    pre_interleaved: true,
                };
                (Some(song), diagnostics)
            }
            Err(failure) => {
                warn!(file_id = self.file_id, error = %failure, "hymn sheet could not be parsed");
                (None, vec![failure])
            }
        }
    }
}

/// Parse `text` into a song, using `fixed_id` when given.
pub fn parse(text: &str, fixed_id: Option<&str>) -> Option<Song> {
    let parser = Parser::new(text.to_string(), 0);
    match fixed_id {
        Some(id) => parser.with_id(id).parse(),
        None => parser.parse(),
    }
}
