mod renderer;
mod resolver;
mod scanner;

pub use renderer::{render_file, render_file_ansi, Renderer};
pub use resolver::{FoldResolver, ResolveError};
pub use scanner::{load_table, locate_folds, FoldScanner, ScanError};
