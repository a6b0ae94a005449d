use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use hymn::{SectionKind, Song, Verse};

use crate::policy::SegmentPolicy;
use crate::slide::{LayoutHint, Slide};

static STANZA_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("stanza pattern is valid"));

/// Split a song into slides with the default policy.
pub fn segment(song: &Song) -> Vec<Slide> {
    segment_with(song, &SegmentPolicy::default())
}

/// Split a song into slides. Pure: the same song and policy always give the
/// same slides.
pub fn segment_with(song: &Song, policy: &SegmentPolicy) -> Vec<Slide> {
    let keys: Vec<&String> = if song.verse_order.is_empty() {
        song.verses.keys().collect()
    } else {
        song.verse_order.iter().collect()
    };

    let mut slides = Vec::new();
    let mut stanza_index = 0;

    for key in keys {
        let Some(verse) = song.verses.get(key) else {
            continue;
        };
        let stanza = Stanza::classify(key, verse);
        if !stanza.is_chorus {
            stanza_index += 1;
        }
        let index = (!stanza.is_chorus).then_some(stanza_index);

        if song.pre_interleaved {
            push_interleaved(&mut slides, key, verse, &stanza, index, policy);
        } else {
            push_legacy(&mut slides, key, verse, &stanza, index, policy);
        }
    }

    trace!(song = %song.id, slides = slides.len(), "song segmented");
    slides
}

/// Per-verse metadata shared by all of its slides.
struct Stanza<'a> {
    label: &'a str,
    is_chorus: bool,
    number: Option<String>,
}

impl<'a> Stanza<'a> {
    fn classify(key: &'a str, verse: &'a Verse) -> Self {
        let label = if verse.name.is_empty() { key } else { verse.name.as_str() };
        let is_chorus = verse.kind == Some(SectionKind::Chorus)
            || label.to_lowercase().starts_with("chorus");
        let number = if is_chorus {
            Some("C".to_string())
        } else {
            STANZA_DIGITS.find(label).map(|m| m.as_str().to_string())
        };
        Stanza {
            label,
            is_chorus,
            number,
        }
    }

    fn slide(&self, label: String, lines: Vec<String>, index: Option<usize>) -> Slide {
        Slide {
            label,
            lines,
            stanza_number: self.number.clone(),
            stanza_index: index,
            is_chorus: self.is_chorus,
            layout_hint: None,
        }
    }
}

fn push_interleaved(
    slides: &mut Vec<Slide>,
    key: &str,
    verse: &Verse,
    stanza: &Stanza<'_>,
    index: Option<usize>,
    policy: &SegmentPolicy,
) {
    if verse.is_empty() {
        slides.push(stanza.slide(key.to_string(), Vec::new(), index));
        return;
    }

    let (size, dense) = policy.chunking(verse.lines.len());
    let chunks: Vec<&[String]> = verse.lines.chunks(size).collect();
    let count = chunks.len();
    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut slide = stanza.slide(chunk_label(stanza.label, i, count), chunk.to_vec(), index);
        if dense {
            slide.layout_hint = Some(LayoutHint::Dense);
        }
        slides.push(slide);
    }
}

/// Fixed-slice chunking for songs whose languages are not merged line by line.
fn push_legacy(
    slides: &mut Vec<Slide>,
    key: &str,
    verse: &Verse,
    stanza: &Stanza<'_>,
    index: Option<usize>,
    policy: &SegmentPolicy,
) {
    let chunks: Vec<&[String]> = verse.lines.chunks(policy.legacy_slice.max(1)).collect();
    let count = chunks.len();
    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut slide = stanza.slide(chunk_label(key, i, count), chunk.to_vec(), index);
        if chunk.len() >= policy.legacy_dense_at {
            slide.layout_hint = Some(LayoutHint::Dense);
        }
        slides.push(slide);
    }
}

/// `base` alone for a single chunk, else `base` plus `a`, `b`, `c`, ...
fn chunk_label(base: &str, index: usize, count: usize) -> String {
    if count <= 1 {
        return base.to_string();
    }
    let suffix = u32::try_from(index)
        .ok()
        .and_then(|i| char::from_u32('a' as u32 + i))
        .unwrap_or('?');
    format!("{}{}", base, suffix)
}
