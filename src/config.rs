//! Configuration loading.
//!
//! Settings come from `symsearch.toml` (or the file named with `--config`) and are
//! then overridden by command line flags.

use crate::error::Result;
use crate::search::MatchMode;
use crate::source::{DiscoveryOptions, SourceFormat};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    time::Duration,
};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "symsearch.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Files or directories holding index sources
    pub sources: Vec<PathBuf>,
    pub format: SourceFormat,
    /// Doxygen search categories picked up from directories
    pub categories: Vec<String>,
    pub match_mode: MatchMode,
    /// Where the compiled snapshot lives; no snapshot when unset
    pub snapshot: Option<PathBuf>,
    /// Maximum "did you mean" suggestions for empty results
    pub suggestion_limit: usize,
    /// Seconds between checks for regenerated sources; 0 disables reloading
    pub reload_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            format: SourceFormat::Auto,
            categories: DiscoveryOptions::default().categories,
            match_mode: MatchMode::Substring,
            snapshot: None,
            suggestion_limit: 5,
            reload_interval_secs: 0,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse symsearch configuration")
    }

    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in the
    /// working directory is used when present, and defaults otherwise. Relative
    /// paths inside the file are resolved against the file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Expands `~` and anchors relative paths at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for source in &mut self.sources {
            *source = resolve_path(base, source);
        }
        if let Some(snapshot) = &mut self.snapshot {
            *snapshot = resolve_path(base, snapshot);
        }
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            format: self.format,
            categories: self.categories.clone(),
        }
    }

    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval_secs > 0).then(|| Duration::from_secs(self.reload_interval_secs))
    }
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(expand_tilde(&path.to_string_lossy()).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
///
/// Returns `Cow::Borrowed` if no expansion needed, `Cow::Owned` if expanded.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
