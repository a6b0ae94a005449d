use std::path::{Path, PathBuf};

use hymn::Song;
use hymn::catalog::sort_by_title;
use tracing::{debug, warn};

use crate::error::{CliError, Result, read_to_string};

/// Files directly inside `dir` with the given extension, sorted by path.
pub fn hymn_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| CliError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .collect();
    files.sort();
    Ok(files)
}

/// Expand a mix of files and directories into the hymn files they name.
pub fn expand_paths(paths: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            out.extend(hymn_files(path, extension)?);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}

/// Load every hymn in `dir`. A song's id is its file stem. Files that cannot
/// be read or parsed are dropped from the batch with a warning.
pub fn load_dir(dir: &Path, extension: &str) -> Result<Vec<Song>> {
    let mut songs = Vec::new();
    for path in hymn_files(dir, extension)? {
        let source = match read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                warn!(error = %err, "skipping unreadable hymn");
                continue;
            }
        };
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match hymn::Parser::new(source, 0).with_id(id).parse() {
            Some(song) => songs.push(song),
            None => warn!(path = %path.display(), "skipping hymn that failed to parse"),
        }
    }
    sort_by_title(&mut songs);
    debug!(dir = %dir.display(), count = songs.len(), "catalog loaded");
    Ok(songs)
}
