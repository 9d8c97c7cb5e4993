//! Prettyfold Core Library
//!
//! Folds source tokens into glyphs: `>=` is shown as `≥`, `lambda` as `λ`,
//! `**` as `^` when it is a binary power operator. The folding is purely
//! presentational; the source text is never changed.
//!
//! # Features
//!
//! - Editable mapping table grouped by category, with JSON import/export
//! - Token-exact matching over Tree-sitter syntax trees (Python, JavaScript, TypeScript)
//! - String literal contents never fold
//! - Context conditions on entries, extensible with host predicates
//! - Text-only fallback when no syntax tree is available
//! - Project scanning, prettified rendering, JSON/YAML/summary output
//!
//! # Example
//!
//! ```no_run
//! use prettyfold_core::{FoldScanner, ScanConfig, OutputFormat, format_output_grouped};
//! use std::path::PathBuf;
//!
//! let config = ScanConfig::new(PathBuf::from("."));
//! let scanner = FoldScanner::new(config).unwrap();
//! let fold_map = scanner.scan().unwrap();
//!
//! let output = format_output_grouped(&fold_map, OutputFormat::Json).unwrap();
//! println!("{}", output);
//! ```

pub mod conditions;
pub mod config;
pub mod engine;
pub mod guard;
pub mod models;
pub mod output;
pub mod parsers;
pub mod settings;
pub mod syntax;
pub mod table;

// Re-exports for convenience
pub use conditions::{ConditionEvaluator, NodeContext, Predicate};
pub use config::{ProjectConfig, ScanConfig};
pub use engine::{
    load_table, render_file, render_file_ansi, FoldResolver, FoldScanner, Renderer, ResolveError,
    ScanError,
};
pub use models::*;
pub use output::{format_output, format_output_grouped, format_summary, FormatError, OutputFormat};
pub use parsers::{create_parser, FoldParser, ParserError};
pub use settings::{default_export_file_name, export_file, import_file, SettingsError};
pub use syntax::{Grammar, SyntaxNode, TokenTree};
pub use table::MappingTable;

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so scan output on stdout stays machine readable.
/// `RUST_LOG` overrides the level chosen by `verbose`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default = if verbose { "prettyfold=debug" } else { "prettyfold=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .try_init();
}
