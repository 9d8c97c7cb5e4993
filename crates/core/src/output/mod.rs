mod json;
mod yaml;

pub use json::{to_json, to_json_compact};
pub use yaml::to_yaml;

use crate::models::{FoldMap, FoldStats, GroupedFoldMap, LanguageSection};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
    Ansi,
}

/// ANSI escapes, or empty strings for plain output
struct Palette {
    bold: &'static str,
    reset: &'static str,
    cyan: &'static str,
    green: &'static str,
    yellow: &'static str,
    dim: &'static str,
}

impl Palette {
    const PLAIN: Palette = Palette {
        bold: "",
        reset: "",
        cyan: "",
        green: "",
        yellow: "",
        dim: "",
    };

    const ANSI: Palette = Palette {
        bold: "\x1b[1m",
        reset: "\x1b[0m",
        cyan: "\x1b[36m",
        green: "\x1b[32m",
        yellow: "\x1b[33m",
        dim: "\x1b[2m",
    };
}

/// Format a FoldMap according to the specified format (flat structure)
pub fn format_output(fold_map: &FoldMap, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(fold_map),
        OutputFormat::Yaml => to_yaml(fold_map),
        OutputFormat::Summary => Ok(format_summary(fold_map)),
        OutputFormat::Ansi => Ok(summary(fold_map, &Palette::ANSI)),
    }
}

/// Format a FoldMap as grouped by language (python/nodejs sections)
pub fn format_output_grouped(
    fold_map: &FoldMap,
    format: OutputFormat,
) -> Result<String, FormatError> {
    let grouped = fold_map.to_grouped();
    match format {
        OutputFormat::Json => to_json_grouped(&grouped),
        OutputFormat::Yaml => to_yaml_grouped(&grouped),
        OutputFormat::Summary => Ok(summary_grouped(&grouped, &Palette::PLAIN)),
        OutputFormat::Ansi => Ok(summary_grouped(&grouped, &Palette::ANSI)),
    }
}

fn to_json_grouped(grouped: &GroupedFoldMap) -> Result<String, FormatError> {
    serde_json::to_string_pretty(grouped).map_err(FormatError::from)
}

fn to_yaml_grouped(grouped: &GroupedFoldMap) -> Result<String, FormatError> {
    serde_yaml::to_string(grouped).map_err(FormatError::from)
}

/// Generate a human-readable summary
pub fn format_summary(fold_map: &FoldMap) -> String {
    summary(fold_map, &Palette::PLAIN)
}

fn summary(fold_map: &FoldMap, p: &Palette) -> String {
    let stats = &fold_map.stats;
    let mut output = String::new();

    output.push_str(&format!(
        "{}{}Glyph Fold Summary{}\n\
         {}=================={}\n\
         {}Root:{} {}\n\n",
        p.bold, p.cyan, p.reset, p.cyan, p.reset, p.dim, p.reset,
        fold_map.root.display()
    ));

    output.push_str(&format!(
        "{}Files Scanned:{} {} (Python: {}, JavaScript: {}, TypeScript: {}, failed: {})\n",
        p.dim, p.reset,
        stats.total_files,
        stats.python_files,
        stats.javascript_files,
        stats.typescript_files,
        stats.failed_files
    ));
    output.push_str(&format!(
        "{}Total Lines:{} {}\n\n",
        p.dim, p.reset, stats.total_lines
    ));

    push_glyphs(&mut output, stats, p);
    push_metadata(&mut output, fold_map, p);

    output
}

fn summary_grouped(grouped: &GroupedFoldMap, p: &Palette) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}{}Glyph Fold Summary (Grouped){}\n\
         {}============================{}\n\
         {}Root:{} {}\n\n",
        p.bold, p.cyan, p.reset, p.cyan, p.reset, p.dim, p.reset,
        grouped.root.display()
    ));

    output.push_str(&format!("{}{}## Python{}\n", p.bold, p.green, p.reset));
    push_section(&mut output, &grouped.python, p);

    output.push_str(&format!(
        "{}{}## Node.js (JavaScript + TypeScript){}\n",
        p.bold, p.yellow, p.reset
    ));
    push_section(&mut output, &grouped.nodejs, p);

    output.push_str(&format!(
        "{}Scan Duration:{} {}ms ({:.2} files/sec)\n",
        p.dim, p.reset,
        grouped.metadata.scan_duration_ms,
        grouped.metadata.files_per_second
    ));

    output
}

fn push_section(output: &mut String, section: &LanguageSection, p: &Palette) {
    output.push_str(&format!(
        "{}Files:{} {} | {}Lines:{} {} | {}Folds:{} {}\n",
        p.dim, p.reset, section.stats.total_files,
        p.dim, p.reset, section.stats.total_lines,
        p.dim, p.reset, section.stats.total_folds,
    ));

    let mut files_by_folds: Vec<_> = section
        .files
        .iter()
        .filter(|f| !f.folds.is_empty())
        .collect();
    files_by_folds.sort_by(|a, b| b.folds.len().cmp(&a.folds.len()));

    if !files_by_folds.is_empty() {
        output.push_str(&format!("{}Top files by folds:{}\n", p.dim, p.reset));
        for file in files_by_folds.iter().take(5) {
            output.push_str(&format!(
                "  {}{}{} ({} folds, {} lines)\n",
                p.yellow,
                file.path.display(),
                p.reset,
                file.folds.len(),
                file.line_count
            ));
        }
    }
    output.push('\n');
}

fn push_glyphs(output: &mut String, stats: &FoldStats, p: &Palette) {
    output.push_str(&format!(
        "{}Total Folds:{} {}\n",
        p.dim, p.reset, stats.total_folds
    ));

    let mut glyphs: Vec<(&String, &usize)> = stats.glyphs.iter().collect();
    glyphs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (glyph, count) in glyphs {
        output.push_str(&format!("  {}{}{} {}\n", p.cyan, glyph, p.reset, count));
    }
    output.push('\n');
}

fn push_metadata(output: &mut String, fold_map: &FoldMap, p: &Palette) {
    let meta = &fold_map.metadata;
    output.push_str(&format!(
        "{}Mappings:{} {}{}\n\
         {}Scan Duration:{} {}ms ({:.2} files/sec)\n\
         {}Timestamp:{} {}\n\
         {}Tool Version:{} {}\n",
        p.dim, p.reset,
        meta.mappings_count,
        if meta.text_mode { " (text mode)" } else { "" },
        p.dim, p.reset,
        meta.scan_duration_ms,
        meta.files_per_second,
        p.dim, p.reset,
        meta.timestamp,
        p.dim, p.reset,
        meta.tool_version
    ));
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
