//! Rewrite hymn sheets so each section block fits a per-language line budget.

use crate::parser::heading::{Heading, Language, trim_line};

/// Default budget used when generating sheets for projection.
pub const DEFAULT_MAX_LINES: usize = 4;

/// Join adjacent line pairs until at most `max_lines` remain. Blank lines are
/// dropped first.
pub fn collapse_lines<S: AsRef<str>>(lines: &[S], language: Language, max_lines: usize) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let mut current: Vec<String> = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    while current.len() > max_lines {
        current = current
            .chunks(2)
            .map(|pair| match pair {
                [first, second] => join(first, second, language),
                [only] => only.clone(),
                _ => String::new(),
            })
            .collect();
    }
    current
}

fn join(first: &str, second: &str, language: Language) -> String {
    let joiner = match language {
        _ if first.ends_with(['—', '-']) => "",
        Language::English => " ",
        Language::Chinese => "",
    };
    format!("{}{}{}", first.trim_end(), joiner, second.trim_start())
}

/// Reflow every section block of a sheet. Lines outside section blocks and the
/// blank lines between blocks are kept as they are.
pub fn reflow_document(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        out.push(line.to_string());
        i += 1;

        let Some(heading) = Heading::recognize(trim_line(line)) else {
            continue;
        };

        let start = i;
        while i < lines.len()
            && !lines[i].trim().is_empty()
            && Heading::recognize(trim_line(lines[i])).is_none()
        {
            i += 1;
        }
        out.extend(collapse_lines(&lines[start..i], heading.language, max_lines));

        while i < lines.len() && lines[i].trim().is_empty() {
            out.push(String::new());
            i += 1;
        }
    }

    let mut result = out.join("\n").trim_end().to_string();
    result.push('\n');
    result
}
