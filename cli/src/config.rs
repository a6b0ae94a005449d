use std::path::{Path, PathBuf};

use serde::Deserialize;
use slides::SegmentPolicy;
use tracing::debug;

use crate::error::{CliError, Result, read_to_string};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG: &str = "hymnal.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub slides: SegmentPolicy,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// File extension of hymn sheets, without the dot.
    pub extension: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            extension: "hymn".to_string(),
        }
    }
}

impl Config {
    /// Load `explicit`, or `hymnal.toml` when it exists, or the defaults.
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG);
                if !default.is_file() {
                    return Ok(Config::default());
                }
                default
            }
        };
        let text = read_to_string(&path)?;
        let config = toml::from_str(&text).map_err(|source| CliError::Config {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}
