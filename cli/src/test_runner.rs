use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use slides::{SegmentPolicy, SlideDeck};

use hymn::{ParseDiagnostic, Song};

const TEST_SUFFIX: &str = ".test.hymn";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectedVerse {
    pub key: String,
    pub lines: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Human-readable test description.
    pub description: Option<String>,

    /// Song id to pass to the parser.
    pub fixed_id: Option<String>,

    /// Segmentation limits; the defaults when absent.
    pub slides: Option<SegmentPolicy>,

    /// If true, the test expects the parser to yield no song.
    pub expect_parse_failure: bool,

    pub expect_title: Option<String>,
    pub expect_ccli: Option<String>,

    /// Expected section keys in presentation order.
    pub expect_order: Option<Vec<String>>,

    /// Expected interleaved lines, per section key.
    pub expect_verse: Vec<ExpectedVerse>,

    /// Expected slide labels, in order.
    pub expect_slides: Option<Vec<String>>,

    pub expect_total_stanzas: Option<usize>,

    /// Labels of the slides that must carry the dense hint. Every other slide
    /// must not.
    pub expect_dense: Option<Vec<String>>,

    /// Expected warnings. If present (even empty), warning count and content are checked.
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

/// Split a `.test.hymn` file into its TOML frontmatter and hymn source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let body = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);

    let close = body
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;
    let frontmatter = body[..close].trim_end_matches('\r');
    let rest = &body[close + 4..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(frontmatter).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> String {
        self.description.clone().unwrap_or_else(|| {
            let name = self
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("?");
            name.strip_suffix(TEST_SUFFIX).unwrap_or(name).to_string()
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };
    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };
    let description = config.description.clone();

    let mut parser = hymn::Parser::new(source.to_string(), 0);
    if let Some(id) = &config.fixed_id {
        parser = parser.with_id(id.clone());
    }
    let (song, diagnostics) = parser.parse_with_diagnostics();

    let outcome = match (config.expect_parse_failure, song) {
        (true, None) => TestOutcome::Pass,
        (true, Some(_)) => TestOutcome::Fail("expected parse failure, but parsing succeeded".into()),
        (false, None) => {
            let msgs: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
            TestOutcome::Fail(format!("unexpected parse failure: {}", msgs.join("; ")))
        }
        (false, Some(song)) => match check_song(&config, &song)
            .or_else(|| check_slides(&config, &song))
            .or_else(|| check_warnings(&config, source, &diagnostics))
        {
            Some(reason) => TestOutcome::Fail(reason),
            None => TestOutcome::Pass,
        },
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

fn mismatch<T: std::fmt::Debug + PartialEq>(what: &str, expected: &T, actual: &T) -> Option<String> {
    (expected != actual).then(|| {
        format!(
            "{} mismatch\n  expected: {:?}\n  actual:   {:?}",
            what, expected, actual
        )
    })
}

/// Check song-level expectations. Returns `Some(reason)` on mismatch.
fn check_song(config: &TestConfig, song: &Song) -> Option<String> {
    if let Some(title) = &config.expect_title {
        if let Some(reason) = mismatch("title", title, &song.title) {
            return Some(reason);
        }
    }
    if config.expect_ccli.is_some() {
        if let Some(reason) = mismatch("ccli", &config.expect_ccli, &song.ccli_no) {
            return Some(reason);
        }
    }
    if let Some(order) = &config.expect_order {
        if let Some(reason) = mismatch("verse order", order, &song.verse_order) {
            return Some(reason);
        }
    }
    for expected in &config.expect_verse {
        let Some(verse) = song.verses.get(&expected.key) else {
            return Some(format!(
                "no verse `{}` (have: {})",
                expected.key,
                song.verse_order.join(", ")
            ));
        };
        let what = format!("verse `{}` lines", expected.key);
        if let Some(reason) = mismatch(&what, &expected.lines, &verse.lines) {
            return Some(reason);
        }
        if let Some(name) = &expected.name {
            let what = format!("verse `{}` name", expected.key);
            if let Some(reason) = mismatch(&what, name, &verse.name) {
                return Some(reason);
            }
        }
    }
    None
}

fn check_slides(config: &TestConfig, song: &Song) -> Option<String> {
    let policy = config.slides.clone().unwrap_or_default();
    let deck = SlideDeck::from_song(song, &policy);

    if let Some(expected) = &config.expect_slides {
        let labels: Vec<String> = deck.slides().iter().map(|s| s.label.clone()).collect();
        if let Some(reason) = mismatch("slide labels", expected, &labels) {
            return Some(reason);
        }
    }
    if let Some(expected) = &config.expect_total_stanzas {
        if let Some(reason) = mismatch("total stanzas", expected, &deck.total_stanzas()) {
            return Some(reason);
        }
    }
    if let Some(expected) = &config.expect_dense {
        let dense: Vec<String> = deck
            .slides()
            .iter()
            .filter(|s| s.is_dense())
            .map(|s| s.label.clone())
            .collect();
        if let Some(reason) = mismatch("dense slides", expected, &dense) {
            return Some(reason);
        }
    }
    None
}

/// Convert a byte offset in `source` to a 1-based line number.
fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

fn check_warnings(
    config: &TestConfig,
    source: &str,
    diagnostics: &[ParseDiagnostic],
) -> Option<String> {
    let expected = config.expect_warnings.as_ref()?;
    let actual: Vec<&ParseDiagnostic> = diagnostics.iter().filter(|d| d.is_warning()).collect();

    if actual.len() != expected.len() {
        let listed = if actual.is_empty() {
            "    (none)".to_string()
        } else {
            actual
                .iter()
                .map(|w| format!("    - {}", w))
                .collect::<Vec<_>>()
                .join("\n")
        };
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            actual.len(),
            listed
        ));
    }

    for (i, (warning, want)) in actual.iter().zip(expected).enumerate() {
        let msg = warning.to_string();
        if !msg.contains(&want.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, want.contains, msg
            ));
        }
        if let Some(line) = want.line {
            let actual_line = byte_offset_to_line(source, warning.span.start);
            if actual_line != line {
                return Some(format!(
                    "warning[{}]: expected on line {}, but span is on line {}",
                    i, line, actual_line
                ));
            }
        }
    }
    None
}

/// Discover `.test.hymn` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "".
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
            continue;
        }
        let is_test = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(TEST_SUFFIX));
        if is_test {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_name(cat: &str) -> &str {
    if cat.is_empty() { "(root)" } else { cat }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }
    eprintln!("available categories:");
    for (cat, files) in &categories {
        eprintln!("  {} ({} tests)", category_name(cat), files.len());
    }
}

/// Terminal styling for the report.
struct Style {
    color: bool,
}

impl Style {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

/// Keep the categories the user asked for; a request also selects its subfolders.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }
    let mut selected = BTreeMap::new();
    for request in requested {
        let req = request.trim_matches('/');
        let prefix = format!("{}/", req);
        let before = selected.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&prefix) {
                selected.insert(cat.as_str(), files);
            }
        }
        if selected.len() == before {
            let available: Vec<&str> = all.keys().map(|k| category_name(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                available.join(", ")
            );
        }
    }
    selected
}

/// Run all `.test.hymn` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { color: !no_color };

    let groups: Vec<(String, Vec<PathBuf>)> = if path.is_file() {
        vec![(String::new(), vec![path.to_path_buf()])]
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        let selected = select_categories(&all, categories);
        if selected.is_empty() {
            eprintln!("no matching categories found");
            return 1;
        }
        selected
            .into_iter()
            .map(|(cat, files)| (cat.to_string(), files.clone()))
            .collect()
    };

    let single = path.is_file();
    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &groups {
        if !single {
            eprintln!();
            eprintln!("{}", style.bold(category_name(cat)));
        }
        for file in files {
            let result = run_single_test(file);
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", style.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", style.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", style.paint("32", "ok"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("31", "FAILED"),
            passed,
            failed,
            passed + failed
        );
        1
    }
}
