use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

use fieldprobe::{
    Addressing, MemoryDocument, MemoryGrid, Paginated, Pattern, ProbeConfig, Tabular,
};

#[derive(Parser, Debug)]
#[command(name = "fieldprobe")]
#[command(about = "Discover extents and locate fields in grid and paginated fixtures")]
#[command(version)]
struct Args {
    /// JSON configuration file (missing keys keep their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search grid fixtures for the first cell matching a pattern
    FindCell {
        /// Glob of grid fixture files
        grids: String,
        /// Regular expression tested against each cell
        pattern: String,
        /// First row offset from the cursor
        #[arg(long, allow_negative_numbers = true)]
        start: Option<i64>,
        /// Last row offset from the cursor
        #[arg(long, allow_negative_numbers = true)]
        stop: Option<i64>,
        /// Override the fixture's cursor row
        #[arg(long, allow_negative_numbers = true)]
        cursor: Option<i64>,
        #[arg(long, short = 'i')]
        ignore_case: bool,
        /// Column base name
        #[arg(long)]
        base_name: Option<String>,
    },
    /// Print the discovered column and row spans of grid fixtures
    Span {
        grids: String,
        #[arg(long, allow_negative_numbers = true)]
        cursor: Option<i64>,
        #[arg(long)]
        base_name: Option<String>,
    },
    /// Localize text below the cursor of a document fixture
    Locate {
        document: PathBuf,
        pattern: String,
        /// Move to the top of this page first
        #[arg(long)]
        page: Option<i64>,
        /// Line position within the selected page
        #[arg(long, default_value_t = 0, requires = "page")]
        height: i64,
        #[arg(long)]
        line_height: Option<i64>,
        #[arg(long)]
        max_offset: Option<i64>,
        #[arg(long, short = 'i')]
        ignore_case: bool,
    },
    /// Print the page table of a document fixture
    Pages { document: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries results, logs go to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .json()
        .init();

    info!(?args, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => ProbeConfig::load(path)?,
        None => ProbeConfig::default(),
    };

    match args.command {
        Command::FindCell {
            grids,
            pattern,
            start,
            stop,
            cursor,
            ignore_case,
            base_name,
        } => {
            if let Some(base_name) = base_name {
                config.tabular.base_name = base_name;
            }
            let pattern = compile(&pattern, ignore_case)?;
            let files = expand_glob(&grids)?;

            let mut hits = 0usize;
            for path in &files {
                let tabular = open_grid(path, cursor, &config)?;
                let cell = tabular.find_cell(&pattern, start, stop)?;
                if cell.is_some() {
                    hits += 1;
                }
                println!("{}", json!({ "file": path.display().to_string(), "cell": cell }));
            }
            info!("Searched {} grids, {} hits", files.len(), hits);
        }
        Command::Span {
            grids,
            cursor,
            base_name,
        } => {
            if let Some(base_name) = base_name {
                config.tabular.base_name = base_name;
            }
            for path in expand_glob(&grids)? {
                let tabular = open_grid(&path, cursor, &config)?;
                println!(
                    "{}",
                    json!({
                        "file": path.display().to_string(),
                        "columns": tabular.columns(),
                        "rows": tabular.rows(),
                        "first_column": tabular.first_column_id(),
                        "last_column": tabular.last_column_id(),
                        "cursor": tabular.cursor_index()?,
                    })
                );
            }
        }
        Command::Locate {
            document,
            pattern,
            page,
            height,
            line_height,
            max_offset,
            ignore_case,
        } => {
            let pattern = compile(&pattern, ignore_case)?;
            let store = MemoryDocument::load_json(&document)?;
            let mut paginated = Paginated::with_config(store, config.boundary.clone())
                .with_context(|| format!("Failed to scan pages of {}", document.display()))?;

            if let Some(page) = page {
                paginated.move_to(Addressing::PageHeight { page, height });
            }

            let position = paginated.current_position();
            let found = paginated.find_text_position_with(&pattern, line_height, max_offset)?;
            if found.is_none() {
                warn!("{} not found below page {} line {}", pattern, position.page(), position.height());
            }
            println!(
                "{}",
                json!({
                    "file": document.display().to_string(),
                    "page": position.page(),
                    "height": position.height(),
                    "boundary": found,
                })
            );
        }
        Command::Pages { document } => {
            let store = MemoryDocument::load_json(&document)?;
            let paginated = Paginated::with_config(store, config.boundary.clone())
                .with_context(|| format!("Failed to scan pages of {}", document.display()))?;
            println!(
                "{}",
                json!({
                    "file": document.display().to_string(),
                    "record_length": paginated.record_length(),
                    "pages": paginated.pages(),
                })
            );
        }
    }

    Ok(())
}

fn compile(source: &str, ignore_case: bool) -> Result<Pattern> {
    let pattern = if ignore_case {
        Pattern::case_insensitive(source)?
    } else {
        Pattern::new(source)?
    };
    Ok(pattern)
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in glob(pattern).with_context(|| format!("Invalid glob pattern {pattern}"))? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("Glob iteration error: {}", e),
        }
    }

    if files.is_empty() {
        anyhow::bail!("No fixture files match {pattern}");
    }
    files.sort();
    info!("Found {} fixture files matching {}", files.len(), pattern);
    Ok(files)
}

fn open_grid(path: &Path, cursor: Option<i64>, config: &ProbeConfig) -> Result<Tabular<MemoryGrid>> {
    let mut store = MemoryGrid::load_json(path)?;
    if let Some(cursor) = cursor {
        store.set_cursor(cursor);
    }
    Tabular::with_config(store, config.tabular.clone())
        .with_context(|| format!("Failed to discover extent of {}", path.display()))
}
