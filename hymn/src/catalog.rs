//! Pure helpers for a song catalog. Loading files is the caller's job.

use crate::Song;

/// Keep only the ASCII digits of `value`.
pub fn normalize_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Numeric value of a digit string, as a canonical string without leading
/// zeros, so arbitrarily long numbers compare without overflow.
fn numeric_key(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() && !digits.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Songs whose CCLI number equals the number typed in `query`. A query without
/// digits matches everything; songs without a CCLI number never match a
/// numeric query.
pub fn filter_by_ccli<'a>(songs: &'a [Song], query: &str) -> Vec<&'a Song> {
    let digits = normalize_digits(query.trim());
    if digits.is_empty() {
        return songs.iter().collect();
    }
    let wanted = numeric_key(&digits);
    songs
        .iter()
        .filter(|song| {
            let song_digits = normalize_digits(song.ccli_no.as_deref().unwrap_or_default());
            !song_digits.is_empty() && numeric_key(&song_digits) == wanted
        })
        .collect()
}

/// Order songs by title, case-insensitively, ties broken by id.
pub fn sort_by_title(songs: &mut [Song]) {
    songs.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    });
}
