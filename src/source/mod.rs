//! Index sources: discovering, reading, and decoding documentation build output.
//!
//! A source path is either a file or a directory. Directories are walked for index
//! files; everything found is read in a stable order so that emission order, and
//! therefore result order, does not depend on the file system.

pub mod doxygen;

use crate::error::SourceError;
use crate::search::IndexTable;
use ignore::WalkBuilder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};
use xxhash_rust::xxh3::Xxh3;

/// Doxygen names its search data `<category>_<hex>.js`.
static DOXYGEN_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)_([0-9a-f]+)\.js$").expect("valid file pattern"));

/// Serialization format of an index source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Decide per file by extension: `.json` or `.js`
    #[default]
    Auto,
    /// Native `IndexTable` JSON
    Json,
    /// Doxygen `searchData` JavaScript
    Doxygen,
}

impl SourceFormat {
    /// Resolves `Auto` against a file's extension.
    pub fn for_path(self, path: &Path) -> Result<Self, SourceError> {
        match self {
            Self::Auto => match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => Ok(Self::Json),
                Some("js") => Ok(Self::Doxygen),
                _ => Err(SourceError::UnknownFormat {
                    path: path.to_path_buf(),
                }),
            },
            format => Ok(format),
        }
    }
}

/// What to pick up when walking a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub format: SourceFormat,
    /// Doxygen categories to include (`all`, `functions`, `classes`, ...)
    pub categories: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            format: SourceFormat::Auto,
            categories: vec!["all".to_string()],
        }
    }
}

impl DiscoveryOptions {
    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };

        let wants_json = matches!(self.format, SourceFormat::Auto | SourceFormat::Json);
        let wants_doxygen = matches!(self.format, SourceFormat::Auto | SourceFormat::Doxygen);

        if wants_json && name.ends_with(".json") {
            return true;
        }

        wants_doxygen
            && DOXYGEN_FILE.captures(name).is_some_and(|caps| {
                self.categories.is_empty() || self.categories.iter().any(|c| c == &caps[1])
            })
    }
}

/// A source file read into memory with its resolved format.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub contents: String,
}

/// Sort key for discovered files: directory, then Doxygen category, then the hex
/// serial as a number, so `all_f.js` precedes `all_10.js`.
fn discovery_order(path: &Path) -> (PathBuf, String, u64, PathBuf) {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match DOXYGEN_FILE.captures(&name) {
        Some(caps) => {
            let serial = u64::from_str_radix(&caps[2], 16).unwrap_or(u64::MAX);
            (dir, caps[1].to_string(), serial, path.to_path_buf())
        }
        None => (dir, name, 0, path.to_path_buf()),
    }
}

/// Expands source paths into an ordered list of index files.
///
/// Explicit file paths are kept as given. Directory contents are sorted by
/// [`discovery_order`], so `all_2.js` always precedes `all_10.js`.
pub fn discover(paths: &[PathBuf], options: &DiscoveryOptions) -> Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(SourceError::Missing { path: path.clone() });
        }

        let mut found = Vec::new();
        for entry in WalkBuilder::new(path).build() {
            let entry = entry.map_err(|source| SourceError::Walk {
                path: path.clone(),
                source,
            })?;
            if entry.file_type().is_some_and(|ft| ft.is_file()) && options.accepts(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort_by_cached_key(|path| discovery_order(path));

        if found.is_empty() {
            tracing::warn!("No index files found under {}", path.display());
        }
        files.extend(found);
    }

    tracing::debug!("Discovered {} index source files", files.len());
    Ok(files)
}

/// Reads every file, resolving its format.
pub fn read_sources(files: &[PathBuf], format: SourceFormat) -> Result<Vec<SourceFile>, SourceError> {
    files
        .iter()
        .map(|path| {
            let format = format.for_path(path)?;
            let contents = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(SourceFile {
                path: path.clone(),
                format,
                contents,
            })
        })
        .collect()
}

/// Digest over every file's path and contents, in order.
///
/// Any regenerated, added, removed, or reordered file changes the digest.
pub fn source_digest(files: &[SourceFile]) -> u64 {
    let mut hasher = Xxh3::new();
    for file in files {
        hasher.update(file.path.as_os_str().as_encoded_bytes());
        hasher.update(&[0]);
        hasher.update(file.contents.as_bytes());
        hasher.update(&[0]);
    }
    hasher.digest()
}

/// Decodes all files into one table.
///
/// JSON tables are appended in file order. Doxygen entries from every file are
/// grouped together afterwards, so a label split across files still yields one key.
pub fn assemble_table(files: &[SourceFile]) -> Result<IndexTable, SourceError> {
    let mut table = IndexTable::default();
    let mut doxygen_entries = Vec::new();

    for file in files {
        match file.format {
            SourceFormat::Doxygen => {
                let entries = doxygen::parse_search_data(&file.contents).map_err(|source| {
                    SourceError::Doxygen {
                        path: file.path.clone(),
                        source,
                    }
                })?;
                tracing::debug!(
                    "Read {} Doxygen entries from {}",
                    entries.len(),
                    file.path.display()
                );
                doxygen_entries.extend(entries);
            }
            SourceFormat::Json | SourceFormat::Auto => {
                let parsed: IndexTable =
                    serde_json::from_str(&file.contents).map_err(|source| SourceError::Json {
                        path: file.path.clone(),
                        source,
                    })?;
                tracing::debug!(
                    "Read {} table entries from {}",
                    parsed.len(),
                    file.path.display()
                );
                table.extend(parsed);
            }
        }
    }

    table.extend(doxygen::into_table(doxygen_entries));
    Ok(table)
}
