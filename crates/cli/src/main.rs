use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use prettyfold_core::settings::is_default;
use prettyfold_core::{
    default_export_file_name, export_file, format_output, format_output_grouped, import_file,
    init_tracing, load_table, render_file, render_file_ansi, ConditionEvaluator, FoldResolver,
    FoldScanner, Language, MappingsDocument, OutputFormat, ProjectConfig, ScanConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "prettyfold")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cosmetic token folding for Python and Node.js/TypeScript")]
#[command(long_about = "Shows operators and keywords as glyphs without touching the source: \
    `>=` as `≥`, `->` as `➔`, `lambda` as `λ`, greek letter names as letters.\n\n\
    Tokens are matched exactly on Tree-sitter syntax trees, so string literal contents \
    and unpacking `**` never fold. Mapping tables are JSON documents that can be \
    exported, edited and imported again.\n\n\
    Output is grouped by language (python/nodejs) by default.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
    pub format: OutputFormatArg,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Mappings document to use instead of the built-in table
    #[arg(long, global = true)]
    pub mappings: Option<PathBuf>,

    /// Project config file (defaults to prettyfold.toml in the root)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Match raw text instead of syntax trees
    #[arg(long, global = true)]
    pub text_mode: bool,

    /// Only scan specific language
    #[arg(long, value_enum)]
    pub language: Option<LanguageFilter>,

    /// Additional ignore patterns (glob style)
    #[arg(long, action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Ignore file path (defaults to .gitignore)
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Include node_modules / .venv in scan
    #[arg(long)]
    pub include_deps: bool,

    /// Use flat output structure (not grouped by language)
    #[arg(long)]
    pub flat: bool,

    /// Disable colors in rendered output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Show verbose progress and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Parallel threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a single file with glyphs applied
    Render {
        /// File to render
        file: PathBuf,

        /// Output with ANSI colors
        #[arg(long)]
        ansi: bool,
    },

    /// List all glyph folds in a file
    List {
        /// File to analyze
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
        format: OutputFormatArg,
    },

    /// Write the active mapping table as a JSON document
    Export {
        /// Destination (defaults to a timestamped file in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the document instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Validate a mappings document and summarize it
    Import {
        /// Document to read
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Summary,
    Ansi,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Summary => OutputFormat::Summary,
            OutputFormatArg::Ansi => OutputFormat::Ansi,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LanguageFilter {
    Python,
    JavaScript,
    TypeScript,
    /// Alias for JS + TS
    Node,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match &args.command {
        Some(Commands::Render { file, ansi }) => run_render(file, *ansi, &args),
        Some(Commands::List { file, format }) => run_list(file, format.clone(), &args),
        Some(Commands::Export { output, stdout }) => run_export(output.as_deref(), *stdout, &args),
        Some(Commands::Import { file }) => run_import(file),
        None => run_scan(&args),
    }
}

/// Builder values from flags, then `prettyfold.toml` underneath
fn build_config(args: &Args) -> anyhow::Result<ScanConfig> {
    let language_filter = args.language.as_ref().map(|l| match l {
        LanguageFilter::Python => vec![Language::Python],
        LanguageFilter::JavaScript => vec![Language::JavaScript],
        LanguageFilter::TypeScript => vec![Language::TypeScript],
        LanguageFilter::Node => vec![Language::JavaScript, Language::TypeScript],
    });

    let mut config = ScanConfig::new(args.path.clone())
        .with_ignore_patterns(args.ignore.clone())
        .with_include_deps(args.include_deps)
        .with_threads(args.threads)
        .with_text_mode(args.text_mode);

    if let Some(languages) = language_filter {
        config = config.with_language_filter(languages);
    }

    if let Some(ref ignore_file) = args.ignore_file {
        config = config.with_ignore_file(ignore_file.clone());
    }

    if let Some(ref mappings) = args.mappings {
        config = config.with_mappings_file(mappings.clone());
    }

    let project = match args.config {
        Some(ref path) => {
            let file = ProjectConfig::load(path)
                .with_context(|| format!("cannot load config {}", path.display()))?;
            let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            Some((file, base_dir))
        }
        None => ProjectConfig::discover(&args.path)?.map(|file| (file, args.path.clone())),
    };

    if let Some((file, base_dir)) = project {
        config = config.merge_file(&file, &base_dir)?;
    }

    tracing::debug!(?config, "resolved scan config");
    Ok(config)
}

fn run_scan(args: &Args) -> anyhow::Result<()> {
    let config = build_config(args)?;

    // Show progress if verbose
    let spinner = if args.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Scanning project...");
        Some(pb)
    } else {
        None
    };

    let scanner = FoldScanner::new(config)?;
    let result = scanner.scan()?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Scanned {} files in {}ms",
            result.stats.total_files, result.metadata.scan_duration_ms
        ));
    }

    // Format output (grouped by default, flat with --flat flag)
    let output = if args.flat {
        format_output(&result, args.format.clone().into())?
    } else {
        format_output_grouped(&result, args.format.clone().into())?
    };

    if let Some(ref path) = args.output {
        fs::write(path, &output)?;
        if args.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn run_render(file: &Path, ansi: bool, args: &Args) -> anyhow::Result<()> {
    let scanner = FoldScanner::new(build_config(args)?)?;

    let rendered = if ansi || (atty::is(atty::Stream::Stdout) && !args.no_color) {
        render_file_ansi(file, &scanner)?
    } else {
        render_file(file, &scanner)?
    };

    print!("{}", rendered.content);

    if args.verbose {
        eprintln!("\n--- {} glyphs applied ---", rendered.fold_count);
    }

    Ok(())
}

fn run_list(file: &Path, format: OutputFormatArg, args: &Args) -> anyhow::Result<()> {
    let scanner = FoldScanner::new(build_config(args)?)?;
    let source_file = scanner.scan_file(file)?;

    if let Some(ref error) = source_file.error {
        anyhow::bail!("cannot fold {}: {}", file.display(), error);
    }

    let output = match format {
        OutputFormatArg::Json => serde_json::to_string_pretty(&source_file)?,
        OutputFormatArg::Yaml => serde_yaml::to_string(&source_file)?,
        OutputFormatArg::Summary | OutputFormatArg::Ansi => {
            let mut out = String::new();
            out.push_str(&format!(
                "File: {}\nLanguage: {}\nLine Count: {}\nFolds: {}\n\n",
                source_file.path.display(),
                source_file.language.as_str(),
                source_file.line_count,
                source_file.folds.len()
            ));

            for (i, fold) in source_file.folds.iter().enumerate() {
                out.push_str(&format!(
                    "{}. {}:{} {} -> {}\n",
                    i + 1,
                    fold.line,
                    fold.column + 1,
                    fold.original,
                    fold.region.placeholder_text()
                ));
            }

            out
        }
    };

    println!("{}", output);
    Ok(())
}

fn run_export(output: Option<&Path>, stdout: bool, args: &Args) -> anyhow::Result<()> {
    let config = build_config(args)?;
    let table = load_table(&config)?;
    let document = MappingsDocument::export(&table, env!("CARGO_PKG_VERSION"), "prettyfold-cli");

    if stdout {
        println!("{}", document.to_json()?);
        return Ok(());
    }

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_export_file_name(chrono::Utc::now())),
    };
    export_file(&path, &document)
        .with_context(|| format!("cannot write {}", path.display()))?;

    eprintln!(
        "Exported {} mappings to {}",
        document.metadata.mappings_count,
        path.display()
    );
    Ok(())
}

fn run_import(file: &Path) -> anyhow::Result<()> {
    let document =
        import_file(file).with_context(|| format!("cannot import {}", file.display()))?;
    let table = document.to_table();

    // Same check a scan would run before using the table
    FoldResolver::new(table.clone(), ConditionEvaluator::with_builtins())?;

    println!(
        "{} mappings in {} categories{}",
        table.len(),
        table.categories().len(),
        if is_default(&table) { " (built-in set)" } else { "" }
    );
    for category in table.categories() {
        let entries = table.entries_in(category);
        let label = if category.is_empty() { "(uncategorized)" } else { category };
        let glyphs: Vec<String> = entries
            .iter()
            .map(|e| format!("{} {}", e.source, e.replacement))
            .collect();
        println!("  {}: {}", label, glyphs.join(", "));
    }

    Ok(())
}
