//! Application configuration management.
//!
//! Scan defaults are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config FILE`, or `config.toml` in the platform config
//!    directory when present
//! 3. `CCDUPE_*` environment variables (e.g. `CCDUPE_MIN_SIZE=1024`)
//!
//! CLI flags are applied on top by [`crate::cli::Cli::apply_to`].
//!
//! ```toml
//! min_size = 1024
//! skip_hidden = true
//! ignore_patterns = ["target/", "*.tmp"]
//! io_threads = 8
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::FinderConfig;
use crate::scanner::{WalkerConfig, DEFAULT_CHUNK_SIZE};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "CCDUPE_";

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has a wrong type.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exclude files smaller than this many bytes
    pub min_size: Option<u64>,
    /// Exclude files larger than this many bytes
    pub max_size: Option<u64>,
    /// Follow symbolic links during the walk
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
    /// Gitignore-style patterns to exclude
    pub ignore_patterns: Vec<String>,
    /// Threads used for hashing and verification
    pub io_threads: usize,
    /// Read chunk size in bytes
    pub chunk_size: usize,
    /// Delete permanently instead of moving to trash
    pub permanent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: None,
            max_size: None,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            io_threads: 4,
            chunk_size: DEFAULT_CHUNK_SIZE,
            permanent: false,
        }
    }
}

impl Config {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// With `config_file` set the file must exist. Without it the default
    /// platform path is used if a file is there.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] for a missing explicit file and
    /// [`ConfigError::Invalid`] when any layer fails to parse.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        if let Some(ref path) = path {
            log::debug!("Loading config from {}", path.display());
        }
        Self::figment(path.as_deref())
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// The layered figment for an optional TOML file.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Platform config path, e.g. `~/.config/ccdupe/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ccdupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Walker settings from this configuration.
    #[must_use]
    pub fn to_walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_follow_symlinks(self.follow_symlinks)
            .with_skip_hidden(self.skip_hidden)
            .with_min_size(self.min_size)
            .with_max_size(self.max_size)
            .with_ignore_patterns(self.ignore_patterns.clone())
    }

    /// Finder settings from this configuration, without shutdown flag or
    /// progress callback.
    #[must_use]
    pub fn to_finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_io_threads(self.io_threads)
            .with_chunk_size(self.chunk_size)
            .with_walker_config(self.to_walker_config())
    }
}
