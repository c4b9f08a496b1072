//! Scraping files and directory trees.

use ignore::WalkBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, ScanConfig};
use crate::language::{CompiledLanguage, LanguageRegistry};
use crate::scraper::{Forest, NodeDirectory, ScrapeWarning, Scraper};

/// Errors raised while scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("No language registered for {path}")]
    UnknownLanguage { path: PathBuf },

    #[error("Unknown language: {0}")]
    LanguageNotFound(String),
}

impl ScanError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// The result of scraping one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub language: String,
    /// SHA-256 of the file content, hex encoded.
    pub hash: String,
    pub forest: Forest,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScrapeWarning>,
    /// The node directory as peeled, before textual reattachment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<NodeDirectory>,
}

/// Scrapes files with languages chosen from a registry.
pub struct Scanner<'a> {
    registry: &'a LanguageRegistry,
    config: ScanConfig,
    default_language: Option<String>,
    language: Option<Arc<CompiledLanguage>>,
    keep_directory: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner with default scan settings.
    pub fn new(registry: &'a LanguageRegistry) -> Self {
        Self {
            registry,
            config: ScanConfig::default(),
            default_language: None,
            language: None,
            keep_directory: false,
        }
    }

    /// Creates a scanner using the scan and language sections of `config`.
    pub fn with_config(registry: &'a LanguageRegistry, config: &Config) -> Self {
        Self {
            config: config.scan.clone(),
            default_language: Some(config.languages.default.clone()),
            ..Self::new(registry)
        }
    }

    /// Scrape every file as `name`, whatever its extension.
    pub fn language(mut self, name: &str) -> Result<Self, ScanError> {
        let language = self
            .registry
            .by_name(name)
            .ok_or_else(|| ScanError::LanguageNotFound(name.to_string()))?;
        self.language = Some(language);
        Ok(self)
    }

    /// Sets the maximum file size.
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// Adds a directory to exclude.
    pub fn exclude_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.exclude_dirs.push(dir.into());
        self
    }

    /// Keep each file's node directory in its report.
    pub fn keep_directory(mut self, keep: bool) -> Self {
        self.keep_directory = keep;
        self
    }

    /// Scrape one file.
    ///
    /// A file whose extension is not registered falls back to the
    /// configured default language.
    pub fn scrape_file(&self, path: impl AsRef<Path>) -> Result<FileReport, ScanError> {
        let path = path.as_ref();
        let language = self
            .resolve_language(path)
            .or_else(|| {
                let name = self.default_language.as_deref()?;
                self.registry.by_name(name)
            })
            .ok_or_else(|| ScanError::UnknownLanguage {
                path: path.to_path_buf(),
            })?;
        self.scrape_with(path, language)
    }

    /// Scrape every file under `root` that has a registered language.
    ///
    /// Hidden files, excluded directories and oversized files are skipped,
    /// as are files that cannot be read. Reports come back in path order.
    pub fn scrape_directory(&self, root: impl AsRef<Path>) -> Result<Vec<FileReport>, ScanError> {
        let root = root.as_ref();
        fs::metadata(root).map_err(|e| ScanError::io(root, e))?;

        let exclude_dirs = self.config.exclude_dirs.clone();
        let follow_gitignore = self.config.follow_gitignore;
        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(follow_gitignore)
            .git_exclude(follow_gitignore)
            .git_global(follow_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && exclude_dirs
                        .iter()
                        .any(|d| entry.file_name().to_str() == Some(d.as_str())))
            })
            .build();

        let mut reports = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let Some(language) = self.resolve_language(path) else {
                tracing::trace!(path = %path.display(), "no language registered");
                continue;
            };

            match self.scrape_with(path, language) {
                Ok(report) => reports.push(report),
                Err(ScanError::TooLarge { path, size, .. }) => {
                    tracing::debug!(path = %path.display(), size, "skipping oversized file");
                }
                Err(e) => tracing::warn!("skipping file: {}", e),
            }
        }

        tracing::info!(root = %root.display(), files = reports.len(), "scanned directory");
        Ok(reports)
    }

    fn resolve_language(&self, path: &Path) -> Option<Arc<CompiledLanguage>> {
        self.language
            .clone()
            .or_else(|| self.registry.for_path(path))
    }

    fn scrape_with(
        &self,
        path: &Path,
        language: Arc<CompiledLanguage>,
    ) -> Result<FileReport, ScanError> {
        let metadata = fs::metadata(path).map_err(|e| ScanError::io(path, e))?;
        if metadata.len() > self.config.max_file_size {
            return Err(ScanError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.config.max_file_size,
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        let language_name = language.name().to_string();
        let scraper = Scraper::new(language);

        let directory = scraper.scrape(&content);
        let warnings = directory.warnings().to_vec();
        let dump = self.keep_directory.then(|| directory.clone());
        let forest = scraper.build_forest(directory);

        tracing::info!(
            path = %path.display(),
            language = %language_name,
            roots = forest.len(),
            "scraped file"
        );

        Ok(FileReport {
            path: path.to_path_buf(),
            language: language_name,
            hash: compute_hash(&content),
            forest,
            warnings,
            directory: dump,
        })
    }
}

/// Scrape one file with the registry's languages and `config`.
pub fn scrape_file(
    path: impl AsRef<Path>,
    registry: &LanguageRegistry,
    config: &Config,
) -> Result<FileReport, ScanError> {
    Scanner::with_config(registry, config).scrape_file(path)
}

/// Scrape a directory tree with the registry's languages and `config`.
pub fn scrape_directory(
    root: impl AsRef<Path>,
    registry: &LanguageRegistry,
    config: &Config,
) -> Result<Vec<FileReport>, ScanError> {
    Scanner::with_config(registry, config).scrape_directory(root)
}

/// Compute SHA256 hash of content for change detection.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash() {
        assert_eq!(
            compute_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(compute_hash("a"), compute_hash("a"));
        assert_ne!(compute_hash("a"), compute_hash("b"));
    }

    #[test]
    fn test_unknown_language_override() {
        let registry = LanguageRegistry::new();
        let err = Scanner::new(&registry).language("cobol").err().unwrap();
        assert!(matches!(err, ScanError::LanguageNotFound(name) if name == "cobol"));
    }
}
