use crate::engine::{FoldScanner, ScanError};
use crate::models::{FoldRegion, RenderedFile};
use crate::table::MappingTable;
use ropey::Rope;
use std::fs;
use std::path::Path;
use termcolor::Color;

/// Renderer for producing prettified output
pub struct Renderer<'a> {
    table: &'a MappingTable,
}

impl<'a> Renderer<'a> {
    pub fn new(table: &'a MappingTable) -> Self {
        Self { table }
    }

    /// Replace every folded token with its glyph, returning plain text
    pub fn render(&self, source: &str, folds: &[FoldRegion]) -> String {
        self.render_counted(source, folds, false).0
    }

    /// Same as `render`, with glyphs coloured by mapping category
    pub fn render_ansi(&self, source: &str, folds: &[FoldRegion]) -> String {
        self.render_counted(source, folds, true).0
    }

    /// Rendered text and the number of regions actually substituted
    pub fn render_counted(&self, source: &str, folds: &[FoldRegion], ansi: bool) -> (String, usize) {
        if ansi {
            self.render_with(source, folds, |fold, original| {
                format!(
                    "{}{}\x1b[0m",
                    ansi_code(self.glyph_color(original)),
                    fold.placeholder_text()
                )
            })
        } else {
            self.render_with(source, folds, |fold, _| fold.placeholder_text().to_string())
        }
    }

    fn render_with<F>(&self, source: &str, folds: &[FoldRegion], placeholder: F) -> (String, usize)
    where
        F: Fn(&FoldRegion, &str) -> String,
    {
        if folds.is_empty() {
            return (source.to_string(), 0);
        }

        let rope = Rope::from_str(source);
        let mut result = String::with_capacity(source.len());

        let mut sorted_folds: Vec<&FoldRegion> = folds.iter().collect();
        sorted_folds.sort_by_key(|f| f.start_offset());

        let mut current_byte = 0;
        let mut applied = 0;

        for fold in sorted_folds {
            // Overlapping or out-of-bounds regions are left as source text
            if fold.start_offset() < current_byte || fold.end_offset() > source.len() {
                continue;
            }
            let Some(original) = source.get(fold.range()) else {
                continue;
            };

            if fold.start_offset() > current_byte {
                let start_char = rope.byte_to_char(current_byte);
                let end_char = rope.byte_to_char(fold.start_offset());
                result.push_str(&rope.slice(start_char..end_char).to_string());
            }

            result.push_str(&placeholder(fold, original));
            applied += 1;

            current_byte = fold.end_offset();
        }

        if current_byte < source.len() {
            let start_char = rope.byte_to_char(current_byte);
            result.push_str(&rope.slice(start_char..).to_string());
        }

        (result, applied)
    }

    /// Get color for the category of the mapping that produced a glyph
    fn glyph_color(&self, original: &str) -> Color {
        let category = self
            .table
            .lookup(original)
            .map(|e| e.category.as_str())
            .unwrap_or_default();

        match category {
            "Comparison" => Color::Blue,
            "Arrow" => Color::Green,
            "Keyword" => Color::Magenta,
            "Operator" => Color::Yellow,
            "Greek Letters" => Color::Cyan,
            _ => Color::White,
        }
    }
}

fn ansi_code(color: Color) -> &'static str {
    match color {
        Color::Blue => "\x1b[34m",
        Color::Green => "\x1b[32m",
        Color::Yellow => "\x1b[33m",
        Color::Magenta => "\x1b[35m",
        Color::Cyan => "\x1b[36m",
        Color::Red => "\x1b[31m",
        _ => "\x1b[1m",
    }
}

/// Render a file with folds applied (convenience function)
pub fn render_file(path: &Path, scanner: &FoldScanner) -> Result<RenderedFile, ScanError> {
    render_path(path, scanner, false)
}

/// Render a file with ANSI colors (convenience function)
pub fn render_file_ansi(path: &Path, scanner: &FoldScanner) -> Result<RenderedFile, ScanError> {
    render_path(path, scanner, true)
}

fn render_path(path: &Path, scanner: &FoldScanner, ansi: bool) -> Result<RenderedFile, ScanError> {
    let language = crate::models::Language::from_extension(
        &path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default(),
    )
    .ok_or_else(|| ScanError::UnsupportedFile(path.to_path_buf()))?;

    let content = fs::read_to_string(path)?;
    let folds = scanner.fold_source(&content, language)?;

    let (rendered, fold_count) =
        Renderer::new(scanner.resolver().table()).render_counted(&content, &folds, ansi);

    Ok(RenderedFile {
        path: path.to_path_buf(),
        content: rendered,
        fold_count,
    })
}
