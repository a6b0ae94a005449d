mod catalog;
mod config;
mod error;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hymn::Song;
use slides::SlideDeck;

use crate::config::Config;
use crate::error::{CliError, Result, read_to_string};

#[derive(Parser)]
#[command(name = "hymnal", version, about = "Bilingual hymn sheets to projection slides")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (defaults to ./hymnal.toml when present)
    #[arg(long, global = true, env = "HYMNAL_CONFIG")]
    config: Option<PathBuf>,

    /// More log output; repeat for trace level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a hymn sheet and print the song
    Show(ShowArgs),

    /// Print the slides of a hymn sheet
    Slides(SlidesArgs),

    /// Report what the parser ignored or repaired
    Check(CheckArgs),

    /// List the hymns in a directory, sorted by title
    Catalog(CatalogArgs),

    /// Join lines so each section fits a per-language line budget
    Reflow(ReflowArgs),

    /// Write a .hymn sheet for every entry of a bilingual hymn index
    Generate(GenerateArgs),

    /// Run .test.hymn conformance files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct ShowArgs {
    /// Hymn sheet to parse
    file: PathBuf,

    /// Print the song as JSON
    #[arg(long)]
    json: bool,

    /// Song id to use instead of a generated one
    #[arg(long)]
    id: Option<String>,
}

#[derive(clap::Args)]
struct SlidesArgs {
    /// Hymn sheet to segment
    file: PathBuf,

    /// Print the slide deck as JSON
    #[arg(long)]
    json: bool,

    /// Start at this slide (1-based); past the end means the last slide
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    from: u32,

    /// Step backwards from the start slide
    #[arg(long)]
    backward: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Hymn sheet to check
    file: PathBuf,
}

#[derive(clap::Args)]
struct CatalogArgs {
    /// Directory of hymn sheets
    dir: PathBuf,

    /// Only hymns whose CCLI number equals this number
    #[arg(long)]
    ccli: Option<String>,
}

#[derive(clap::Args)]
struct ReflowArgs {
    /// Hymn sheets, or directories of them
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Maximum lines per language in each section
    #[arg(long, default_value_t = hymn::reflow::DEFAULT_MAX_LINES)]
    max_lines: usize,

    /// List files that would change without writing them
    #[arg(long)]
    dry_run: bool,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Index file with Chinese and English entries
    index: PathBuf,

    /// Directory to write the sheets into
    #[arg(short, long, default_value = "public/hymns")]
    output: PathBuf,

    /// Start each file name with the hymn number
    #[arg(long)]
    prefix_number: bool,

    /// Also write the cleaned index back to its file
    #[arg(long)]
    rewrite_index: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.hymn file or directory containing them
    path: PathBuf,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info,hymn=debug,slides=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Show(args) => do_show(args),
        Command::Slides(args) => do_slides(args, &config),
        Command::Check(args) => do_check(args, cli.no_color),
        Command::Catalog(args) => do_catalog(args, &config),
        Command::Reflow(args) => do_reflow(args, &config),
        Command::Generate(args) => do_generate(args),
        Command::Test(args) => {
            if args.list_categories {
                test_runner::list_categories(&args.path);
                return;
            }
            let code = test_runner::run_tests(&args.path, cli.no_color, &args.category);
            process::exit(code);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn load_song(path: &Path, id: Option<String>) -> Result<Song> {
    let source = read_to_string(path)?;
    let mut parser = hymn::Parser::new(source, 0);
    if let Some(id) = id {
        parser = parser.with_id(id);
    }
    parser.parse().ok_or_else(|| CliError::Parse {
        path: path.to_path_buf(),
    })
}

fn do_show(args: ShowArgs) -> Result<()> {
    let song = load_song(&args.file, args.id)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&song)?);
    } else {
        print!("{}", song);
    }
    Ok(())
}

fn do_slides(args: SlidesArgs, config: &Config) -> Result<()> {
    let song = load_song(&args.file, None)?;
    let deck = SlideDeck::from_song(&song, &config.slides);
    debug!(slides = deck.len(), stanzas = deck.total_stanzas(), "deck built");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&deck)?);
        return Ok(());
    }

    println!("{}", song.heading());
    let start = args.from as usize - 1;
    for idx in deck.walk(start, args.backward) {
        let Some(slide) = deck.get(idx) else {
            continue;
        };
        println!();
        let caption = deck.caption(idx).unwrap_or_default();
        println!("{:>3}. {:<6} {}", idx + 1, caption, slide.to_string().trim_end());
    }
    Ok(())
}

fn do_check(args: CheckArgs, no_color: bool) -> Result<()> {
    let source = read_to_string(&args.file)?;

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.display().to_string(), source.clone());

    let (song, diagnostics) = hymn::Parser::new(source, file_id).parse_with_diagnostics();

    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for diagnostic in &diagnostics {
        let _ = term::emit_to_write_style(
            &mut writer.lock(),
            &config,
            &files,
            &diagnostic.to_diagnostic(),
        );
    }

    match song {
        Some(song) => {
            eprintln!(
                "ok: {} parsed into {} section(s)",
                args.file.display(),
                song.verse_order.len()
            );
            Ok(())
        }
        None => Err(CliError::Parse { path: args.file }),
    }
}

fn do_catalog(args: CatalogArgs, config: &Config) -> Result<()> {
    let songs = catalog::load_dir(&args.dir, &config.catalog.extension)?;
    let query = args.ccli.as_deref().unwrap_or_default();
    let matches = hymn::catalog::filter_by_ccli(&songs, query);

    if matches.is_empty() {
        if query.trim().is_empty() {
            eprintln!("No hymns available.");
        } else {
            eprintln!("No hymns match “{}”.", query.trim());
        }
        return Ok(());
    }
    for song in matches {
        println!("{:<24} {}", song.id, song.heading());
    }
    Ok(())
}

fn do_reflow(args: ReflowArgs, config: &Config) -> Result<()> {
    let files = catalog::expand_paths(&args.paths, &config.catalog.extension)?;
    let mut changed = 0usize;
    for path in &files {
        let original = read_to_string(path)?;
        let reflowed = hymn::reflow::reflow_document(&original, args.max_lines);
        if reflowed == original {
            continue;
        }
        changed += 1;
        if args.dry_run {
            println!("would reflow {}", path.display());
            continue;
        }
        write_file(path, &reflowed)?;
        info!(path = %path.display(), "reflowed");
    }
    eprintln!("{} of {} file(s) changed", changed, files.len());
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn do_generate(args: GenerateArgs) -> Result<()> {
    let raw = read_to_string(&args.index)?;
    let sanitized = hymn::index::sanitize_index(&raw);
    if args.rewrite_index && sanitized != raw {
        write_file(&args.index, &sanitized)?;
        info!(path = %args.index.display(), "index cleaned");
    }

    let hymns = hymn::index::generate(&sanitized, args.prefix_number);
    std::fs::create_dir_all(&args.output).map_err(|source| CliError::Write {
        path: args.output.clone(),
        source,
    })?;
    for sheet in &hymns {
        let path = args.output.join(&sheet.file_name);
        write_file(&path, &sheet.content)?;
        debug!(number = %sheet.number, path = %path.display(), "sheet written");
    }
    eprintln!("{} sheet(s) written to {}", hymns.len(), args.output.display());
    Ok(())
}
