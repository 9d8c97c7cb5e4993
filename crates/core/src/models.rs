use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// Structural condition a mapping entry must satisfy before it folds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionKind {
    /// Always applies
    #[default]
    None,
    /// The token's parent node is a binary expression (`a ** b`, not `f(**kw)`)
    ParentIsBinaryExpression,
    /// Host-registered predicate, looked up by name
    Custom(String),
}

impl ConditionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionKind::None => "none",
            ConditionKind::ParentIsBinaryExpression => "parent_is_binary_expression",
            ConditionKind::Custom(name) => name,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ConditionKind::None)
    }
}

impl From<String> for ConditionKind {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "none" | "NONE" => ConditionKind::None,
            // PY_BINARY_EXP is the tag used by older mapping files
            "parent_is_binary_expression" | "PARENT_IS_BINARY_EXPRESSION" | "PY_BINARY_EXP" => {
                ConditionKind::ParentIsBinaryExpression
            }
            other => ConditionKind::Custom(other.to_string()),
        }
    }
}

impl From<ConditionKind> for String {
    fn from(kind: ConditionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One replacement rule: exact token text to glyph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Exact token text to match
    #[serde(rename = "from", default)]
    pub source: String,
    /// Glyph shown in place of the token
    #[serde(rename = "to", default)]
    pub replacement: String,
    /// Presentation group; empty means uncategorized
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "ConditionKind::is_none")]
    pub condition: ConditionKind,
}

impl MappingEntry {
    pub fn new(
        source: impl Into<String>,
        replacement: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            replacement: replacement.into(),
            category: category.into(),
            condition: ConditionKind::None,
        }
    }

    pub fn with_condition(mut self, condition: ConditionKind) -> Self {
        self.condition = condition;
        self
    }
}

/// A token span the host should display as a glyph.
///
/// Regions are created fresh by every resolve call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegionFields")]
pub struct FoldRegion {
    start_offset: usize,
    end_offset: usize,
    placeholder_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    collapsed_by_default: bool,
    non_expandable: bool,
}

/// Wire shape of a region; converted through `FoldRegion::new` so a
/// reversed range read from disk is normalized too
#[derive(Deserialize)]
struct RegionFields {
    start_offset: usize,
    end_offset: usize,
    placeholder_text: String,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    collapsed_by_default: bool,
    #[serde(default)]
    non_expandable: bool,
}

impl From<RegionFields> for FoldRegion {
    fn from(fields: RegionFields) -> Self {
        Self {
            group: fields.group,
            collapsed_by_default: fields.collapsed_by_default,
            non_expandable: fields.non_expandable,
            ..Self::new(fields.start_offset..fields.end_offset, fields.placeholder_text)
        }
    }
}

impl FoldRegion {
    /// Create an expandable region; a reversed range is normalized
    pub fn new(range: Range<usize>, placeholder_text: impl Into<String>) -> Self {
        let (start_offset, end_offset) = if range.start <= range.end {
            (range.start, range.end)
        } else {
            (range.end, range.start)
        };

        Self {
            start_offset,
            end_offset,
            placeholder_text: placeholder_text.into(),
            group: None,
            collapsed_by_default: false,
            non_expandable: false,
        }
    }

    /// Region for a single atomic token: collapsed and non-expandable
    pub fn token(range: Range<usize>, placeholder_text: impl Into<String>) -> Self {
        Self {
            collapsed_by_default: true,
            non_expandable: true,
            ..Self::new(range, placeholder_text)
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn range(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }

    pub fn placeholder_text(&self) -> &str {
        &self.placeholder_text
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn collapsed_by_default(&self) -> bool {
        self.collapsed_by_default
    }

    pub fn is_non_expandable(&self) -> bool {
        self.non_expandable
    }

    pub fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Check if this region contains another
    pub fn contains(&self, other: &FoldRegion) -> bool {
        self.start_offset <= other.start_offset && self.end_offset >= other.end_offset
    }

    /// Check if this region overlaps with another
    pub fn overlaps(&self, other: &FoldRegion) -> bool {
        self.start_offset < other.end_offset && self.end_offset > other.start_offset
    }
}

/// Export metadata accompanying a mappings document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingsMetadata {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub plugin_version: String,
    #[serde(default)]
    pub ide_version: String,
    #[serde(default)]
    pub mappings_count: usize,
    #[serde(default)]
    pub comment: String,
}

/// Import/export unit for a mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingsDocument {
    #[serde(flatten)]
    pub metadata: MappingsMetadata,
    pub mappings: Vec<MappingEntry>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Language of the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "py" | "pyi" => Some(Language::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            "ts" | "mts" | "cts" | "tsx" => Some(Language::TypeScript),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "javascript" | "js" => Some(Language::JavaScript),
            "typescript" | "ts" => Some(Language::TypeScript),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
        }
    }
}

/// A fold region located in its file, as reported by the scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenFold {
    #[serde(flatten)]
    pub region: FoldRegion,
    /// Original token text
    pub original: String,
    /// Line of the token (1-indexed)
    pub line: usize,
    /// Column of the token in chars (0-indexed)
    pub column: usize,
}

/// A source file with its fold regions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Relative path from project root
    pub path: PathBuf,
    /// Absolute path
    pub absolute_path: PathBuf,
    /// Detected language
    pub language: Language,
    /// Glyph folds in document order
    pub folds: Vec<TokenFold>,
    /// Total line count
    pub line_count: usize,
    /// Whether the file was parsed successfully
    pub parsed: bool,
    /// Parse error message if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statistics about fold analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoldStats {
    pub total_files: usize,
    pub failed_files: usize,
    pub total_folds: usize,
    pub python_files: usize,
    pub javascript_files: usize,
    pub typescript_files: usize,
    pub total_lines: usize,
    /// Fold count per placeholder glyph
    pub glyphs: BTreeMap<String, usize>,
}

impl FoldStats {
    pub fn add_file(&mut self, file: &SourceFile) {
        self.total_files += 1;
        if !file.parsed {
            self.failed_files += 1;
        }
        match file.language {
            Language::Python => self.python_files += 1,
            Language::JavaScript => self.javascript_files += 1,
            Language::TypeScript => self.typescript_files += 1,
        }
        self.total_lines += file.line_count;
        for fold in &file.folds {
            self.add_fold(&fold.region);
        }
    }

    pub fn add_fold(&mut self, region: &FoldRegion) {
        self.total_folds += 1;
        *self
            .glyphs
            .entry(region.placeholder_text().to_string())
            .or_insert(0) += 1;
    }
}

/// Scan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_duration_ms: u64,
    pub files_per_second: f64,
    pub timestamp: String,
    pub tool_version: String,
    pub mappings_count: usize,
    pub text_mode: bool,
}

impl Default for ScanMetadata {
    fn default() -> Self {
        Self {
            scan_duration_ms: 0,
            files_per_second: 0.0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            mappings_count: 0,
            text_mode: false,
        }
    }
}

/// Language-specific section of the fold map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSection {
    pub files: Vec<SourceFile>,
    pub stats: FoldStats,
}

impl LanguageSection {
    fn from_files(files: Vec<SourceFile>) -> Self {
        let mut stats = FoldStats::default();
        for file in &files {
            stats.add_file(file);
        }
        Self { files, stats }
    }
}

/// Aggregated fold analysis results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldMap {
    /// Project root path
    pub root: PathBuf,
    /// All source files analyzed
    pub files: Vec<SourceFile>,
    pub stats: FoldStats,
    pub metadata: ScanMetadata,
}

impl FoldMap {
    /// Convert to grouped format (python/nodejs sections)
    pub fn to_grouped(&self) -> GroupedFoldMap {
        let (python, nodejs): (Vec<SourceFile>, Vec<SourceFile>) = self
            .files
            .iter()
            .cloned()
            .partition(|f| f.language == Language::Python);

        GroupedFoldMap {
            root: self.root.clone(),
            python: LanguageSection::from_files(python),
            nodejs: LanguageSection::from_files(nodejs),
            metadata: self.metadata.clone(),
        }
    }
}

/// Grouped fold map with separate sections for Python and Node.js
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedFoldMap {
    pub root: PathBuf,
    pub python: LanguageSection,
    /// JavaScript + TypeScript
    pub nodejs: LanguageSection,
    pub metadata: ScanMetadata,
}

/// Rendered output for a single file
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
    pub fold_count: usize,
}
