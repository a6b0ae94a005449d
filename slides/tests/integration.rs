use std::collections::BTreeMap;

use hymn::{SectionKind, Song, Verse};
use slides::{LayoutHint, SegmentPolicy, Slide, SlideDeck, segment, segment_with, total_stanzas};

fn parsed(source: &str) -> Song {
    hymn::parse(source, Some("t")).expect("parse failed")
}

/// A song with a single English-only verse of `n` lines.
fn verse_of(label: &str, n: usize) -> Song {
    let mut source = format!("{} English:\n", label);
    for i in 1..=n {
        source.push_str(&format!("line {}\n", i));
    }
    parsed(&source)
}

fn labels(slides: &[Slide]) -> Vec<&str> {
    slides.iter().map(|s| s.label.as_str()).collect()
}

fn raw_song(verses: &[(&str, &str, Option<SectionKind>, usize)], order: bool, pre: bool) -> Song {
    let mut map = BTreeMap::new();
    let mut verse_order = Vec::new();
    for (key, name, kind, n) in verses {
        map.insert(
            key.to_string(),
            Verse {
                name: name.to_string(),
                lines: (1..=*n).map(|i| format!("{} {}", key, i)).collect(),
                kind: *kind,
            },
        );
        if order {
            verse_order.push(key.to_string());
        }
    }
    Song {
        id: "raw".into(),
        title: "Raw".into(),
        ccli_no: None,
        verse_order,
        verses: map,
        pre_interleaved: pre,
    }
}

#[test]
fn seven_lines_one_slide_without_suffix() {
    let slides = segment(&verse_of("Verse 1", 7));
    assert_eq!(labels(&slides), vec!["Verse 1"]);
    assert_eq!(slides[0].lines.len(), 7);
    assert_eq!(slides[0].layout_hint, None);
}

#[test]
fn eight_lines_fill_one_slide() {
    let slides = segment(&verse_of("Verse 1", 8));
    assert_eq!(labels(&slides), vec!["Verse 1"]);
}

#[test]
fn nine_lines_split_with_letters() {
    let slides = segment(&verse_of("Verse 1", 9));
    assert_eq!(labels(&slides), vec!["Verse 1a", "Verse 1b"]);
    assert_eq!(slides[0].lines.len(), 8);
    assert_eq!(slides[1].lines, vec!["line 9"]);
    assert_eq!(slides[0].stanza_index, Some(1));
    assert_eq!(slides[1].stanza_index, Some(1));
}

#[test]
fn twenty_lines_three_slides() {
    let slides = segment(&verse_of("Verse 2", 20));
    assert_eq!(labels(&slides), vec!["Verse 2a", "Verse 2b", "Verse 2c"]);
    assert_eq!(slides[2].lines.len(), 4);
}

#[test]
fn balanced_ten_line_stanza_is_one_dense_slide() {
    let mut source = String::from("Verse 1 English:\n");
    for i in 1..=5 {
        source.push_str(&format!("en {}\n", i));
    }
    source.push_str("Verse 1 Chinese:\n");
    for i in 1..=5 {
        source.push_str(&format!("zh {}\n", i));
    }
    let slides = segment(&parsed(&source));
    assert_eq!(slides.len(), 1);
    assert_eq!(slides[0].label, "Verse 1");
    assert_eq!(slides[0].lines.len(), 10);
    assert_eq!(slides[0].lines[0], "en 1");
    assert_eq!(slides[0].lines[1], "zh 1");
    assert_eq!(slides[0].layout_hint, Some(LayoutHint::Dense));
    assert!(slides[0].is_dense());
}

#[test]
fn dense_predicate_only_holds_for_ten() {
    let policy = SegmentPolicy::default();
    let balanced: Vec<usize> = (0..=200).filter(|&n| policy.is_balanced_stanza(n)).collect();
    assert_eq!(balanced, vec![10]);
}

#[test]
fn eleven_lines_are_not_dense() {
    let slides = segment(&verse_of("Verse 1", 11));
    assert_eq!(labels(&slides), vec!["Verse 1a", "Verse 1b"]);
    assert!(slides.iter().all(|s| s.layout_hint.is_none()));
}

#[test]
fn stanza_indices_skip_chorus() {
    let song = parsed("Verse 1 English:\na\nChorus English:\nb\nVerse 2 English:\nc");
    let slides = segment(&song);
    let indices: Vec<Option<usize>> = slides.iter().map(|s| s.stanza_index).collect();
    assert_eq!(indices, vec![Some(1), None, Some(2)]);
    assert_eq!(total_stanzas(&slides), 2);

    let numbers: Vec<Option<&str>> = slides.iter().map(|s| s.stanza_number.as_deref()).collect();
    assert_eq!(numbers, vec![Some("1"), Some("C"), Some("2")]);
    assert!(slides[1].is_chorus);
}

#[test]
fn stanza_index_follows_walk_order_not_label() {
    let song = parsed("Verse 3 English:\na\nBridge English:\nb\nVerse 1 English:\nc");
    let slides = segment(&song);
    let indices: Vec<Option<usize>> = slides.iter().map(|s| s.stanza_index).collect();
    assert_eq!(indices, vec![Some(1), Some(2), Some(3)]);
    assert_eq!(slides[0].stanza_number.as_deref(), Some("3"));
    assert_eq!(slides[1].stanza_number, None);
}

#[test]
fn chorus_detected_from_label_when_kind_missing() {
    let song = raw_song(
        &[("c", "CHORUS (refrain)", None, 2), ("v", "Verse 12", None, 2)],
        true,
        true,
    );
    let slides = segment(&song);
    assert!(slides[0].is_chorus);
    assert_eq!(slides[0].stanza_number.as_deref(), Some("C"));
    assert_eq!(slides[0].stanza_index, None);
    assert_eq!(slides[1].stanza_number.as_deref(), Some("12"));
    assert_eq!(slides[1].stanza_index, Some(1));
}

#[test]
fn empty_verse_keeps_one_slide_labelled_by_key() {
    let song = parsed("Verse 1 English:\nVerse 2 English:\nb");
    let slides = segment(&song);
    assert_eq!(labels(&slides), vec!["verse 1", "Verse 2"]);
    assert!(slides[0].lines.is_empty());
    assert_eq!(slides[0].stanza_index, Some(1));
    assert_eq!(slides[0].stanza_number.as_deref(), Some("1"));
    assert_eq!(slides[0].layout_hint, None);
}

#[test]
fn empty_song_yields_no_slides() {
    let song = parsed("");
    assert!(segment(&song).is_empty());
    assert_eq!(total_stanzas(&[]), 0);
}

#[test]
fn segmentation_is_idempotent() {
    let song = parsed("Verse 1 English:\na\nb\nChorus English:\nc\nVerse 1 Chinese:\nd");
    let before = song.clone();
    assert_eq!(segment(&song), segment(&song));
    assert_eq!(song, before);
}

#[test]
fn falls_back_to_map_keys_without_order() {
    let song = raw_song(
        &[("b", "Verse 2", Some(SectionKind::Verse), 1), ("a", "Verse 1", Some(SectionKind::Verse), 1)],
        false,
        true,
    );
    let slides = segment(&song);
    assert_eq!(labels(&slides), vec!["Verse 1", "Verse 2"]);
}

#[test]
fn order_keys_without_verse_are_skipped() {
    let mut song = raw_song(&[("a", "Verse 1", Some(SectionKind::Verse), 1)], true, true);
    song.verse_order.insert(0, "missing".into());
    let slides = segment(&song);
    assert_eq!(labels(&slides), vec!["Verse 1"]);
    assert_eq!(slides[0].stanza_index, Some(1));
}

#[test]
fn name_falls_back_to_key() {
    let song = raw_song(&[("verse 4", "", None, 9)], true, true);
    let slides = segment(&song);
    assert_eq!(labels(&slides), vec!["verse 4a", "verse 4b"]);
    assert_eq!(slides[0].stanza_number.as_deref(), Some("4"));
}

#[test]
fn legacy_path_slices_by_four_and_labels_by_key() {
    let song = raw_song(
        &[("v1", "Verse 1", Some(SectionKind::Verse), 9), ("c", "Chorus", Some(SectionKind::Chorus), 3)],
        true,
        false,
    );
    let slides = segment(&song);
    assert_eq!(labels(&slides), vec!["v1a", "v1b", "v1c", "c"]);
    assert_eq!(slides[2].lines, vec!["v1 9"]);
    assert!(slides.iter().all(|s| s.layout_hint.is_none()));
}

#[test]
fn legacy_path_drops_empty_verse_and_marks_long_chunks() {
    let song = raw_song(
        &[("a", "Verse 1", Some(SectionKind::Verse), 0), ("b", "Verse 2", Some(SectionKind::Verse), 12)],
        true,
        false,
    );
    let policy = SegmentPolicy {
        legacy_slice: 12,
        ..SegmentPolicy::default()
    };
    let slides = segment_with(&song, &policy);
    assert_eq!(labels(&slides), vec!["b"]);
    assert_eq!(slides[0].stanza_index, Some(2));
    assert_eq!(slides[0].layout_hint, Some(LayoutHint::Dense));
}

#[test]
fn custom_policy_changes_chunk_size() {
    let policy = SegmentPolicy {
        max_lines: 4,
        ..SegmentPolicy::default()
    };
    let slides = segment_with(&verse_of("Verse 1", 6), &policy);
    assert_eq!(labels(&slides), vec!["Verse 1a", "Verse 1b"]);
}

#[test]
fn policy_from_toml() {
    let policy: SegmentPolicy = toml::from_str("max_lines = 6\n").unwrap();
    assert_eq!(policy.max_lines, 6);
    assert_eq!(policy.dense_half, 5);
    assert_eq!(policy, SegmentPolicy { max_lines: 6, ..SegmentPolicy::default() });
}

#[test]
fn deck_captions_and_navigation() {
    let song = parsed("Verse 1 English:\na\nChorus English:\nb\nVerse 2 English:\nc");
    let deck = SlideDeck::from_song(&song, &SegmentPolicy::default());
    assert_eq!(deck.len(), 3);
    assert_eq!(deck.total_stanzas(), 2);
    assert_eq!(deck.caption(0).as_deref(), Some("1/2"));
    assert_eq!(deck.caption(1).as_deref(), Some("Chorus"));
    assert_eq!(deck.caption(2).as_deref(), Some("2/2"));
    assert_eq!(deck.caption(3), None);

    assert_eq!(deck.clamp(10), Some(2));
    assert_eq!(deck.next(2), Some(2));
    assert_eq!(deck.next(0), Some(1));
    assert_eq!(deck.prev(0), Some(0));
    assert_eq!(deck.prev(2), Some(1));
}

#[test]
fn deck_walks_forward_and_back_from_a_position() {
    let song = parsed("Verse 1 English:\na\nChorus English:\nc\nVerse 2 English:\nb");
    let deck = SlideDeck::from_song(&song, &SegmentPolicy::default());
    assert_eq!(deck.walk(0, false), vec![0, 1, 2]);
    assert_eq!(deck.walk(1, false), vec![1, 2]);
    assert_eq!(deck.walk(99, false), vec![2]);
    assert_eq!(deck.walk(99, true), vec![2, 1, 0]);
    assert!(SlideDeck::new(Vec::new()).walk(0, false).is_empty());
}

#[test]
fn chorus_only_deck() {
    let deck = SlideDeck::new(segment(&parsed("Chorus English:\na")));
    assert_eq!(deck.total_stanzas(), 0);
    assert_eq!(deck.caption(0).as_deref(), Some("Chorus"));
}

#[test]
fn empty_deck_has_no_positions() {
    let deck = SlideDeck::new(Vec::new());
    assert!(deck.is_empty());
    assert_eq!(deck.clamp(0), None);
    assert_eq!(deck.next(0), None);
    assert_eq!(deck.caption(0), None);
}
