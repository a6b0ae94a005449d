use std::collections::BTreeSet;

use serde::Serialize;

use hymn::Song;

use crate::policy::SegmentPolicy;
use crate::segmenter::segment_with;
use crate::slide::Slide;

/// Number of distinct stanza indices across `slides`. The denominator for
/// "stanza X of N".
pub fn total_stanzas(slides: &[Slide]) -> usize {
    slides
        .iter()
        .filter_map(|s| s.stanza_index)
        .collect::<BTreeSet<_>>()
        .len()
}

/// A song's slides together with the aggregates the display needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDeck {
    slides: Vec<Slide>,
    total_stanzas: usize,
}

impl SlideDeck {
    pub fn new(slides: Vec<Slide>) -> Self {
        let total_stanzas = total_stanzas(&slides);
        SlideDeck {
            slides,
            total_stanzas,
        }
    }

    pub fn from_song(song: &Song, policy: &SegmentPolicy) -> Self {
        Self::new(segment_with(song, policy))
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn total_stanzas(&self) -> usize {
        self.total_stanzas
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Slide> {
        self.slides.get(idx)
    }

    /// Bound `idx` to the last slide. `None` for an empty deck.
    pub fn clamp(&self, idx: usize) -> Option<usize> {
        self.slides.len().checked_sub(1).map(|last| idx.min(last))
    }

    /// Slide after `idx`, staying on the last one. Display shells call this on
    /// "next" key presses.
    pub fn next(&self, idx: usize) -> Option<usize> {
        self.clamp(idx.saturating_add(1))
    }

    /// Slide before `idx`, staying on the first one.
    pub fn prev(&self, idx: usize) -> Option<usize> {
        self.clamp(idx.saturating_sub(1))
    }

    /// Every position visited by stepping from `from` (clamped) until `next`,
    /// or `prev` when `backward`, stops moving.
    pub fn walk(&self, from: usize, backward: bool) -> Vec<usize> {
        let mut visited = Vec::new();
        let mut current = self.clamp(from);
        while let Some(idx) = current {
            visited.push(idx);
            let step = if backward { self.prev(idx) } else { self.next(idx) };
            current = step.filter(|&to| to != idx);
        }
        visited
    }

    /// Stanza caption for the slide at `idx`: `Chorus`, `2/3`, or `–/3`.
    pub fn caption(&self, idx: usize) -> Option<String> {
        let slide = self.slides.get(idx)?;
        if slide.is_chorus {
            return Some("Chorus".to_string());
        }
        if self.total_stanzas == 0 {
            return None;
        }
        Some(match slide.stanza_index {
            Some(i) => format!("{}/{}", i, self.total_stanzas),
            None => format!("–/{}", self.total_stanzas),
        })
    }
}
