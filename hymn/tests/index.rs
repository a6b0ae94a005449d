use hymn::index::{self, IndexSection};
use hymn::parser::heading::Language;

const INDEX: &str = "\
101 奇异恩典 1.2.3
1 奇异恩典，何等甘甜，
我罪已得赦免！
和 赞美主
101 Amazing Grace 8.6.8.6
1 Amazing grace, how sweet the sound
That saved a wretch like me
Chorus Praise the Lord
2 Twas grace that taught
";

#[test]
fn cjk_detection_and_title_cleanup() {
    assert!(index::has_cjk("Amazing 恩典"));
    assert!(!index::has_cjk("Amazing Grace"));
    assert_eq!(index::clean_title("Amazing Grace 8.6.8.6"), "Amazing Grace");
    assert_eq!(index::clean_title("  圣哉 11.12.12.10 D "), "圣哉");
    assert_eq!(index::clean_title("Plain"), "Plain");
}

#[test]
fn sanitize_drops_meters_banners_and_markers() {
    let raw = "102 圣哉 11.12.12.10\n特.\n8.7.8.7.\n赞美和敬拜 1 圣哉圣哉\n第二行\n\
               102 Holy Holy 11.12.12.10\nHoly, holy, holy\nLord God Almighty";
    assert_eq!(
        index::sanitize_index(raw),
        "102 圣哉\n1 圣哉圣哉\n第二行\n102 Holy Holy\n1 Holy, holy, holy\nLord God Almighty\n"
    );
}

#[test]
fn sanitize_drops_repeated_stanza_headings() {
    let raw = "103 恩典 8.6\n1 恩典\n1 恩典够用，\n103 Grace 8.6\n1 Sufficient\n\
               1 Grace is enough,\n2 Old — 2 Still enough\n3 Title — Heading\n";
    assert_eq!(
        index::sanitize_index(raw),
        "103 恩典\n1 恩典够用，\n103 Grace\n1 Grace is enough,\n2 Still enough\n"
    );
}

#[test]
fn sanitize_is_stable() {
    let once = index::sanitize_index(INDEX);
    assert_eq!(index::sanitize_index(&once), once);
}

#[test]
fn blocks_split_into_stanzas_and_choruses() {
    let english = [
        "Praise and Worship",
        "opening line",
        "2 second stanza",
        "(C) refrain",
        "chorus: again",
    ];
    let sections = index::parse_block(&english[..], Language::English);
    assert_eq!(
        sections,
        vec![
            IndexSection { is_chorus: false, label: "1".into(), lines: vec!["opening line".into()] },
            IndexSection { is_chorus: false, label: "2".into(), lines: vec!["second stanza".into()] },
            IndexSection { is_chorus: true, label: "C".into(), lines: vec!["refrain".into()] },
            IndexSection { is_chorus: true, label: "C".into(), lines: vec!["again".into()] },
        ]
    );
    assert_eq!(sections[1].heading(), "Verse 2");
    assert_eq!(sections[2].heading(), "Chorus");

    let chinese = ["副歌：哈利路亚", "1 第一节"];
    let sections = index::parse_block(&chinese[..], Language::Chinese);
    assert!(sections[0].is_chorus);
    assert_eq!(sections[0].lines, vec!["哈利路亚"]);
    assert_eq!(sections[1].label, "1");
}

#[test]
fn blocks_are_collapsed_to_the_line_budget() {
    let english = ["1 a", "b", "c", "d", "e", "f"];
    let sections = index::parse_block(&english[..], Language::English);
    assert_eq!(sections[0].lines, vec!["a b", "c d", "e f"]);

    let chinese = ["1 甲", "乙", "丙", "丁", "戊"];
    let sections = index::parse_block(&chinese[..], Language::Chinese);
    assert_eq!(sections[0].lines, vec!["甲乙", "丙丁", "戊"]);
}

#[test]
fn entries_pair_chinese_and_english_headers() {
    let entries = index::split_entries(INDEX);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].number, "101");
    assert_eq!(entries[0].title_cn, "奇异恩典 1.2.3");
    assert_eq!(entries[0].title_en, "Amazing Grace 8.6.8.6");
    assert_eq!(entries[0].cn_lines.len(), 3);
    assert_eq!(entries[0].en_lines.len(), 4);
}

#[test]
fn english_header_without_chinese_is_skipped() {
    assert!(index::generate("200 Lonely\n1 line\n", false).is_empty());
}

#[test]
fn generated_sheet_parses_back() {
    let hymns = index::generate(INDEX, false);
    assert_eq!(hymns.len(), 1);
    assert_eq!(hymns[0].file_name, "Amazing Grace.hymn");

    let song = hymn::parse(&hymns[0].content, Some("101")).expect("generated sheet parses");
    assert_eq!(song.title, "Amazing Grace (奇异恩典)");
    assert_eq!(song.ccli_no.as_deref(), Some("101"));
    assert_eq!(song.verse_order, vec!["verse 1", "chorus", "verse 2"]);
    assert_eq!(
        song.verses["verse 1"].lines,
        vec![
            "Amazing grace, how sweet the sound",
            "奇异恩典，何等甘甜，",
            "That saved a wretch like me",
            "我罪已得赦免！",
        ]
    );
    assert_eq!(song.verses["chorus"].lines, vec!["Praise the Lord", "赞美主"]);
    assert_eq!(song.verses["verse 2"].lines, vec!["Twas grace that taught"]);

    let (_, diagnostics) = hymn::Parser::new(hymns[0].content.clone(), 0).parse_with_diagnostics();
    assert!(diagnostics.is_empty());
}

#[test]
fn file_names_are_prefixed_and_path_safe() {
    let source = "007 这 / 那\n1 行\n007 This / That\n1 line\n";
    let hymns = index::generate(source, true);
    assert_eq!(hymns[0].number, "007");
    assert_eq!(hymns[0].file_name, "007 This - That.hymn");
    assert!(hymns[0].content.starts_with("Title: This / That (这 / 那)\nCCLI: 007\n"));
    assert_eq!(index::generate(source, false)[0].file_name, "This - That.hymn");
}
