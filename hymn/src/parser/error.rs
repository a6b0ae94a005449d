use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// What the parser ignored, repaired, or failed on.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// Lyric text before the first section heading.
    StrayLine,
    /// A Chinese block with nothing left to pair with got a section of its own.
    SynthesizedSection { key: String },
    /// A Chinese block paired with a section of a different base label.
    ReassignedChinese { heading: String, key: String },
    /// Parser invariant failure. The parse yields no song.
    Internal(String),
}

/// A parse diagnostic with its byte span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseDiagnostic {
    pub kind: DiagnosticKind,
    pub span: Range<usize>,
    pub file_id: usize,
}

impl ParseDiagnostic {
    pub fn new(kind: DiagnosticKind, span: Range<usize>, file_id: usize) -> Self {
        ParseDiagnostic { kind, span, file_id }
    }

    pub fn internal(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Self::new(DiagnosticKind::Internal(message.into()), span, file_id)
    }

    pub fn severity(&self) -> Severity {
        match self.kind {
            DiagnosticKind::StrayLine | DiagnosticKind::SynthesizedSection { .. } => {
                Severity::Warning
            }
            DiagnosticKind::ReassignedChinese { .. } => Severity::Note,
            DiagnosticKind::Internal(_) => Severity::Error,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }

    fn notes(&self) -> Vec<String> {
        match &self.kind {
            DiagnosticKind::StrayLine => {
                vec!["lines before the first `<Section> English:` heading are ignored".into()]
            }
            DiagnosticKind::SynthesizedSection { .. } => {
                vec!["every earlier section already has Chinese lines".into()]
            }
            DiagnosticKind::ReassignedChinese { .. } => {
                vec!["no English block with the same label is waiting for a translation".into()]
            }
            DiagnosticKind::Internal(_) => Vec::new(),
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity())
            .with_message(self.to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes())
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::StrayLine => write!(f, "line outside any section is ignored"),
            DiagnosticKind::SynthesizedSection { key } => {
                write!(f, "unpaired Chinese block opens new section `{}`", key)
            }
            DiagnosticKind::ReassignedChinese { heading, key } => {
                write!(f, "Chinese block `{}` paired with section `{}`", heading, key)
            }
            DiagnosticKind::Internal(msg) => write!(f, "internal parser error: {}", msg),
        }
    }
}

impl std::error::Error for ParseDiagnostic {}
