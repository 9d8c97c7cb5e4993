//! Scan configuration, `prettyfold.toml` loading and ignore filtering

use crate::models::Language;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project config file looked up in the scan root
pub const CONFIG_FILE_NAME: &str = "prettyfold.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to build glob pattern: {0}")]
    GlobError(#[from] globset::Error),
    #[error("Failed to parse gitignore: {0}")]
    GitignoreError(#[from] ignore::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Unknown language in config: {0}")]
    UnknownLanguage(String),
}

/// Configuration for scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root directory to scan
    pub root: PathBuf,
    /// Filter to specific languages
    pub language_filter: Option<Vec<Language>>,
    /// Additional ignore patterns (glob style)
    pub ignore_patterns: Vec<String>,
    /// Custom ignore file path
    pub ignore_file: Option<PathBuf>,
    /// Include node_modules/.venv in scan
    pub include_deps: bool,
    /// Number of threads (0 = auto)
    pub threads: usize,
    /// Mappings document to load instead of the built-in table
    pub mappings_file: Option<PathBuf>,
    /// Scan raw text instead of syntax trees
    pub text_mode: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            language_filter: None,
            ignore_patterns: vec![],
            ignore_file: None,
            include_deps: false,
            threads: 0,
            mappings_file: None,
            text_mode: false,
        }
    }
}

impl ScanConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    pub fn with_language_filter(mut self, languages: Vec<Language>) -> Self {
        self.language_filter = Some(languages);
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_ignore_file(mut self, path: PathBuf) -> Self {
        self.ignore_file = Some(path);
        self
    }

    pub fn with_include_deps(mut self, include: bool) -> Self {
        self.include_deps = include;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_mappings_file(mut self, path: PathBuf) -> Self {
        self.mappings_file = Some(path);
        self
    }

    pub fn with_text_mode(mut self, text_mode: bool) -> Self {
        self.text_mode = text_mode;
        self
    }

    /// Layer a project file under the builder values: a file setting only
    /// fills what is still at its default. Relative paths resolve against the
    /// file's directory.
    pub fn merge_file(mut self, file: &ProjectConfig, base_dir: &Path) -> Result<Self, ConfigError> {
        if self.mappings_file.is_none() {
            self.mappings_file = file.mappings.as_ref().map(|p| base_dir.join(p));
        }
        if self.language_filter.is_none() && !file.languages.is_empty() {
            let languages = file
                .languages
                .iter()
                .map(|name| {
                    Language::from_name(name).ok_or_else(|| ConfigError::UnknownLanguage(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.language_filter = Some(languages);
        }
        self.ignore_patterns.extend(file.ignore.iter().cloned());
        if self.threads == 0 {
            self.threads = file.threads.unwrap_or(0);
        }
        self.text_mode |= file.text_mode;
        self.include_deps |= file.include_deps;
        Ok(self)
    }
}

/// Contents of `prettyfold.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Mappings document (JSON) relative to the config file
    pub mappings: Option<PathBuf>,
    pub languages: Vec<String>,
    pub ignore: Vec<String>,
    pub threads: Option<usize>,
    pub text_mode: bool,
    pub include_deps: bool,
}

impl ProjectConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded project config");
        Ok(config)
    }

    /// Load `prettyfold.toml` from `root` if present
    pub fn discover(root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }
}

/// Filter for ignoring files and directories
pub struct IgnoreFilter {
    gitignore: Option<Gitignore>,
    custom_globs: GlobSet,
    default_ignores: GlobSet,
}

impl IgnoreFilter {
    pub fn new(config: &ScanConfig) -> Result<Self, ConfigError> {
        // Load .gitignore if present
        let gitignore = if let Some(ref ignore_file) = config.ignore_file {
            let mut builder = GitignoreBuilder::new(&config.root);
            builder.add(ignore_file);
            Some(builder.build()?)
        } else {
            let gitignore_path = config.root.join(".gitignore");
            if gitignore_path.exists() {
                let mut builder = GitignoreBuilder::new(&config.root);
                builder.add(&gitignore_path);
                Some(builder.build()?)
            } else {
                None
            }
        };

        let mut custom_builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            custom_builder.add(Glob::new(pattern)?);
        }
        let custom_globs = custom_builder.build()?;

        // Dependency and build directories unless include_deps is set
        let mut default_builder = GlobSetBuilder::new();
        if !config.include_deps {
            for pattern in [
                "**/node_modules/**",
                "**/.venv/**",
                "**/venv/**",
                "**/__pycache__/**",
                "**/dist/**",
                "**/build/**",
                "**/.git/**",
                "**/*.min.js",
            ] {
                default_builder.add(Glob::new(pattern)?);
            }
        }
        let default_ignores = default_builder.build()?;

        Ok(Self {
            gitignore,
            custom_globs,
            default_ignores,
        })
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        if self.default_ignores.is_match(path) || self.custom_globs.is_match(path) {
            return true;
        }

        if let Some(ref gi) = self.gitignore {
            if gi.matched(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }

    /// Check if path matches language filter
    pub fn matches_language_filter(&self, path: &Path, filter: &Option<Vec<Language>>) -> bool {
        let Some(lang) = path
            .extension()
            .and_then(|ext| Language::from_extension(&ext.to_string_lossy()))
        else {
            return false;
        };

        match filter {
            Some(langs) => langs.contains(&lang),
            None => true,
        }
    }
}
