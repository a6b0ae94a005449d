use hymn::Song;
use hymn::catalog::{filter_by_ccli, normalize_digits, sort_by_title};

fn song(id: &str, title: &str, ccli: Option<&str>) -> Song {
    let mut source = format!("Title: {}\n", title);
    if let Some(ccli) = ccli {
        source.push_str(&format!("CCLI: {}\n", ccli));
    }
    source.push_str("Verse 1 English:\nline\n");
    hymn::parse(&source, Some(id)).unwrap()
}

fn ids(songs: &[&Song]) -> Vec<String> {
    songs.iter().map(|s| s.id.clone()).collect()
}

#[test]
fn digits_only() {
    assert_eq!(normalize_digits("No. 0029-a"), "0029");
    assert_eq!(normalize_digits("abc"), "");
}

#[test]
fn filter_compares_numerically() {
    let songs = vec![
        song("a", "A", Some("29")),
        song("b", "B", Some("029")),
        song("c", "C", Some("129")),
        song("d", "D", None),
    ];
    assert_eq!(ids(&filter_by_ccli(&songs, " 29 ")), vec!["a", "b"]);
    assert_eq!(ids(&filter_by_ccli(&songs, "#0029")), vec!["a", "b"]);
    assert_eq!(ids(&filter_by_ccli(&songs, "129")), vec!["c"]);
    assert!(filter_by_ccli(&songs, "7").is_empty());
}

#[test]
fn filter_without_digits_returns_everything() {
    let songs = vec![song("a", "A", Some("1")), song("b", "B", None)];
    assert_eq!(filter_by_ccli(&songs, "").len(), 2);
    assert_eq!(filter_by_ccli(&songs, "hymn").len(), 2);
}

#[test]
fn zero_matches_zero() {
    let songs = vec![song("a", "A", Some("000")), song("b", "B", Some("0"))];
    assert_eq!(ids(&filter_by_ccli(&songs, "0")), vec!["a", "b"]);
}

#[test]
fn sorts_by_title_case_insensitively() {
    let mut songs = vec![
        song("3", "holy, holy", None),
        song("1", "Amazing Grace", None),
        song("2", "Be Thou My Vision", None),
    ];
    sort_by_title(&mut songs);
    let titles: Vec<&str> = songs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Amazing Grace", "Be Thou My Vision", "holy, holy"]);
}
