use hymn::parser::heading::Language;
use hymn::reflow::{collapse_lines, reflow_document};

#[test]
fn short_blocks_are_only_trimmed() {
    let out = collapse_lines(&["  a ", "", "b"], Language::English, 4);
    assert_eq!(out, vec!["a", "b"]);
}

#[test]
fn english_pairs_join_with_space() {
    let out = collapse_lines(&["a", "b", "c", "d", "e"], Language::English, 4);
    assert_eq!(out, vec!["a b", "c d", "e"]);
}

#[test]
fn chinese_pairs_join_without_separator() {
    let out = collapse_lines(&["天", "地", "人", "和", "心"], Language::Chinese, 4);
    assert_eq!(out, vec!["天地", "人和", "心"]);
}

#[test]
fn hyphenated_line_joins_tight() {
    let out = collapse_lines(&["hal-", "le", "lu—", "jah", "amen"], Language::English, 4);
    assert_eq!(out, vec!["hal-le", "lu—jah", "amen"]);
}

#[test]
fn repeats_until_within_budget() {
    let input: Vec<String> = (1..=9).map(|n| n.to_string()).collect();
    let out = collapse_lines(&input[..], Language::English, 2);
    assert_eq!(out, vec!["1 2 3 4 5 6 7 8", "9"]);
}

#[test]
fn document_reflow_keeps_structure() {
    let source = "Title: T\nCCLI: 1\n\nVerse 1 English:\na\nb\nc\nd\ne\n\nVerse 1 Chinese:\n一\n二\n三\n四\n五\n";
    let out = reflow_document(source, 4);
    assert_eq!(
        out,
        "Title: T\nCCLI: 1\n\nVerse 1 English:\na b\nc d\ne\n\nVerse 1 Chinese:\n一二\n三四\n五\n"
    );
}

#[test]
fn document_reflow_is_stable() {
    let source = "Verse 1 English:\na\nb\nChorus English:\nc\n";
    let once = reflow_document(source, 4);
    assert_eq!(once, source);
    assert_eq!(reflow_document(&once, 4), once);
}

#[test]
fn reflowed_document_still_parses() {
    let source = "Verse 1 English:\na\nb\nc\nd\ne\nf\n\nVerse 1 Chinese:\n1\n2\n3\n4\n5\n6\n";
    let song = hymn::parse(&reflow_document(source, 4), None).unwrap();
    assert_eq!(song.verses["verse 1"].lines, vec!["a b", "12", "c d", "34", "e f", "56"]);
}

#[test]
fn byte_order_mark_does_not_hide_first_heading() {
    let source = "\u{feff}Verse 1 English:\na\nb\nc\nd\ne\n";
    let out = reflow_document(source, 4);
    assert_eq!(out, "\u{feff}Verse 1 English:\na b\nc d\ne\n");
}
