use crate::conditions::ConditionEvaluator;
use crate::config::{IgnoreFilter, ScanConfig};
use crate::engine::{FoldResolver, ResolveError};
use crate::models::{FoldMap, FoldRegion, FoldStats, Language, ScanMetadata, SourceFile, TokenFold};
use crate::parsers::create_parser;
use crate::settings::{import_file, SettingsError};
use crate::table::MappingTable;
use rayon::prelude::*;
use ropey::Rope;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("Parser error: {0}")]
    ParserError(#[from] crate::parsers::ParserError),
    #[error("Mapping error: {0}")]
    ResolveError(#[from] ResolveError),
    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),
    #[error("Unsupported file extension: {0}")]
    UnsupportedFile(PathBuf),
}

/// Load the table named by the config, or the built-in one
pub fn load_table(config: &ScanConfig) -> Result<MappingTable, SettingsError> {
    match config.mappings_file {
        Some(ref path) => Ok(import_file(path)?.to_table()),
        None => Ok(MappingTable::defaults()),
    }
}

/// Resolves glyph folds across every source file of a project
pub struct FoldScanner {
    config: ScanConfig,
    ignore_filter: IgnoreFilter,
    resolver: FoldResolver,
}

impl FoldScanner {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let table = load_table(&config)?;
        let resolver = FoldResolver::new(table, ConditionEvaluator::with_builtins())?;
        Self::with_resolver(config, resolver)
    }

    /// Scanner using a host-built resolver (custom predicates, edited tables)
    pub fn with_resolver(config: ScanConfig, resolver: FoldResolver) -> Result<Self, ScanError> {
        let ignore_filter = IgnoreFilter::new(&config)?;
        Ok(Self {
            config,
            ignore_filter,
            resolver,
        })
    }

    pub fn resolver(&self) -> &FoldResolver {
        &self.resolver
    }

    /// Scan the project and return the fold map
    pub fn scan(&self) -> Result<FoldMap, ScanError> {
        let start = Instant::now();

        let source_files = self.find_source_files();

        let files: Vec<SourceFile> = if self.config.threads == 1 {
            source_files
                .iter()
                .map(|(path, lang)| self.parse_file(path, *lang))
                .collect()
        } else {
            let pool = if self.config.threads > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.threads)
                    .build()
                    .ok()
            } else {
                None
            };

            match pool {
                Some(pool) => pool.install(|| {
                    source_files
                        .par_iter()
                        .map(|(path, lang)| self.parse_file(path, *lang))
                        .collect()
                }),
                None => source_files
                    .par_iter()
                    .map(|(path, lang)| self.parse_file(path, *lang))
                    .collect(),
            }
        };

        let mut stats = FoldStats::default();
        for file in &files {
            stats.add_file(file);
        }

        let duration = start.elapsed();
        let metadata = ScanMetadata {
            scan_duration_ms: duration.as_millis() as u64,
            files_per_second: if duration.as_secs_f64() > 0.0 {
                files.len() as f64 / duration.as_secs_f64()
            } else {
                0.0
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            mappings_count: self.resolver.table().len(),
            text_mode: self.config.text_mode,
        };

        tracing::info!(
            files = stats.total_files,
            folds = stats.total_folds,
            ms = metadata.scan_duration_ms,
            "scan finished"
        );

        Ok(FoldMap {
            root: self.config.root.clone(),
            files,
            stats,
            metadata,
        })
    }

    /// Scan a single file
    pub fn scan_file(&self, path: &Path) -> Result<SourceFile, ScanError> {
        let language = language_of(path)?;
        Ok(self.parse_file(path, language))
    }

    /// Fold regions for in-memory source
    pub fn fold_source(&self, source: &str, language: Language) -> Result<Vec<FoldRegion>, ScanError> {
        if self.config.text_mode {
            return Ok(self.resolver.resolve_text(source));
        }
        let mut parser = create_parser(language)?;
        Ok(parser.parse(source, &self.resolver)?)
    }

    /// Find all source files matching the language filter
    fn find_source_files(&self) -> Vec<(PathBuf, Language)> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.config.root)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_type().is_dir() || !self.ignore_filter.should_ignore(e.path(), true)
            });

        for entry in walker.filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            if self.ignore_filter.should_ignore(path, false) {
                continue;
            }

            if !self
                .ignore_filter
                .matches_language_filter(path, &self.config.language_filter)
            {
                continue;
            }

            if let Ok(lang) = language_of(path) {
                files.push((path.to_path_buf(), lang));
            }
        }

        files.sort();
        files
    }

    /// Parse a single source file; failures are recorded, never propagated
    fn parse_file(&self, path: &Path, language: Language) -> SourceFile {
        let relative_path = path
            .strip_prefix(&self.config.root)
            .unwrap_or(path)
            .to_path_buf();

        let failed = |line_count: usize, error: String| SourceFile {
            path: relative_path.clone(),
            absolute_path: path.to_path_buf(),
            language,
            folds: vec![],
            line_count,
            parsed: false,
            error: Some(error),
        };

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read file");
                return failed(0, e.to_string());
            }
        };

        let line_count = content.lines().count();

        let regions = match self.fold_source(&content, language) {
            Ok(regions) => regions,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot fold file");
                return failed(line_count, e.to_string());
            }
        };

        SourceFile {
            path: relative_path.clone(),
            absolute_path: path.to_path_buf(),
            language,
            folds: locate_folds(&content, regions),
            line_count,
            parsed: true,
            error: None,
        }
    }
}

fn language_of(path: &Path) -> Result<Language, ScanError> {
    path.extension()
        .and_then(|ext| Language::from_extension(&ext.to_string_lossy()))
        .ok_or_else(|| ScanError::UnsupportedFile(path.to_path_buf()))
}

/// Attach line/column and original text to each region
pub fn locate_folds(content: &str, regions: Vec<FoldRegion>) -> Vec<TokenFold> {
    let rope = Rope::from_str(content);
    regions
        .into_iter()
        .map(|region| {
            let start = region.start_offset().min(content.len());
            let line = rope.byte_to_line(start);
            let column = rope.byte_to_char(start) - rope.line_to_char(line);
            let original = content
                .get(region.range())
                .unwrap_or_default()
                .to_string();
            TokenFold {
                region,
                original,
                line: line + 1,
                column,
            }
        })
        .collect()
}
