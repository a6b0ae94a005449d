pub mod deck;
pub mod policy;
pub mod segmenter;
pub mod slide;

pub use deck::{SlideDeck, total_stanzas};
pub use policy::SegmentPolicy;
pub use segmenter::{segment, segment_with};
pub use slide::{LayoutHint, Slide};
