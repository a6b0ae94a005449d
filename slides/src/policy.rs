use serde::Deserialize;

/// Chunking limits for the segmenter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SegmentPolicy {
    /// Lines per slide for pre-interleaved songs.
    pub max_lines: usize,
    /// A verse of exactly `dense_half` English plus `dense_half` Chinese lines
    /// stays on one dense slide.
    pub dense_half: usize,
    /// Slice size for songs whose lines are not pre-interleaved.
    pub legacy_slice: usize,
    /// Legacy chunks at least this long are marked dense.
    pub legacy_dense_at: usize,
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        SegmentPolicy {
            max_lines: 8,
            dense_half: 5,
            legacy_slice: 4,
            legacy_dense_at: 10,
        }
    }
}

impl SegmentPolicy {
    /// True when `line_count` interleaved lines split into `dense_half`
    /// English and `dense_half` Chinese lines.
    pub fn is_balanced_stanza(&self, line_count: usize) -> bool {
        line_count.div_ceil(2) == self.dense_half && line_count / 2 == self.dense_half
    }

    /// Chunk size for a pre-interleaved verse and whether it renders dense.
    pub fn chunking(&self, line_count: usize) -> (usize, bool) {
        if self.is_balanced_stanza(line_count) {
            (line_count.max(1), true)
        } else {
            (self.max_lines.max(1), false)
        }
    }
}
