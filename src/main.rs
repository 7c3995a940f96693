//! # Docmill CLI (`docmill`)
//!
//! The `docmill` binary turns heterogeneous source files (spreadsheets,
//! PDFs, Word documents, images, plain text) into normalized knowledge-base
//! entries, emitted as JSON and/or a SQL import script.
//!
//! ## Usage
//!
//! ```bash
//! docmill [--config ./config/docmill.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docmill process <path>` | Process a file or directory into knowledge-base entries |
//! | `docmill inspect <file>` | Show the descriptor and entries for a single file |
//! | `docmill formats` | List supported extensions by category |
//!
//! ## Examples
//!
//! ```bash
//! # Process one file, writing kb_entries.json into ./kb_output
//! docmill process report.xlsx
//!
//! # Process a directory tree, emitting both JSON and SQL artifacts
//! docmill process ./docs --recursive --sql
//!
//! # Dry-look at what a single file produces
//! docmill inspect handbook.pdf
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

use docmill::{classify, config, descriptor, export, ocr, pipeline, report, stats};

/// Docmill — a multi-format document ingestion pipeline for searchable
/// knowledge bases.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docmill.example.toml` for a full example; without the
/// flag, `config/docmill.toml` is used when present, else built-in defaults.
#[derive(Parser)]
#[command(
    name = "docmill",
    about = "Docmill — convert documents into normalized knowledge-base entries",
    version,
    long_about = "Docmill classifies input files by extension, applies a format-specific \
    extraction strategy with graceful degradation (table-aware PDF reading falls back to a \
    structural pass, unknown formats fall back to plain text), chunks large content, tags it \
    against a domain vocabulary, and emits deterministic knowledge-base entries as JSON and/or \
    a PostgreSQL import script."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When omitted, `config/docmill.toml` is loaded if it exists;
    /// otherwise built-in defaults apply.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Process a file or directory into knowledge-base entries.
    ///
    /// Classifies each file, extracts and chunks its content, and writes
    /// the resulting entries into the output directory. JSON is the
    /// default artifact; `--sql` adds a PostgreSQL upsert script.
    Process {
        /// File or directory to process.
        input: PathBuf,

        /// Output directory for generated artifacts.
        ///
        /// Defaults to the `[output] dir` config value (`kb_output`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Recurse into subdirectories when the input is a directory.
        #[arg(short, long)]
        recursive: bool,

        /// Write the JSON artifact (the default when no artifact flag is given).
        #[arg(long)]
        json: bool,

        /// Write the SQL import script.
        #[arg(long)]
        sql: bool,

        /// Maximum number of files to process.
        #[arg(long)]
        limit: Option<usize>,

        /// Progress reporting mode: `off`, `human`, or `json`.
        /// Defaults to `human` on a terminal, `off` otherwise.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Show the descriptor and entries for a single file.
    ///
    /// Processes the file in memory and prints what would be emitted,
    /// without writing any artifact.
    Inspect {
        /// File to inspect.
        file: PathBuf,
    },

    /// List supported extensions by category.
    Formats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_default()?,
    };

    match cli.command {
        Commands::Process {
            input,
            out,
            recursive,
            json,
            sql,
            limit,
            progress,
        } => {
            let mode = parse_progress(progress.as_deref())?;
            let reporter = mode.reporter();
            let outcome = pipeline::run(&cfg, &input, recursive, limit, reporter.as_ref())?;

            if outcome.entries.is_empty() {
                eprintln!("No entries were produced.");
                return Ok(());
            }

            stats::print_summary(&outcome);

            let out_dir = out.unwrap_or_else(|| cfg.output.dir.clone());
            if json || !sql {
                let path = out_dir.join(export::JSON_FILENAME);
                export::write_json(&outcome.entries, &path)?;
                println!("wrote {}", path.display());
            }
            if sql {
                let path = out_dir.join(export::SQL_FILENAME);
                export::write_sql(&outcome.entries, &path)?;
                println!("wrote {}", path.display());
            }
            println!("ok");
        }

        Commands::Inspect { file } => {
            let desc = descriptor::build(&file, classify::classify(&file))?;
            let recognizer = ocr::create_recognizer(&cfg.ocr)?;
            let reporter = report::ReportMode::Off.reporter();
            let entries =
                pipeline::process_file(&file, &cfg, recognizer.as_ref(), reporter.as_ref())?;

            println!("File:      {}", desc.name);
            println!("Path:      {}", desc.path.display());
            println!("Category:  {}", desc.category);
            println!("MIME:      {}", desc.mime_type);
            println!("Size:      {} bytes", desc.size_bytes);
            println!("Checksum:  {}", desc.checksum);
            println!();
            println!("Entries: {}", entries.len());
            for entry in &entries {
                println!(
                    "  {}  {:<12} conf {:.2}  chunks {:>3}  {}",
                    entry.uuid,
                    entry.document_type,
                    entry.confidence_score,
                    entry.chunks.len(),
                    entry.title
                );
            }
        }

        Commands::Formats => {
            let mut by_category: BTreeMap<String, Vec<&str>> = BTreeMap::new();
            for &(ext, category) in classify::supported_extensions() {
                by_category.entry(category.to_string()).or_default().push(ext);
            }

            println!("Supported extensions");
            println!("====================");
            println!();
            for (category, mut exts) in by_category {
                exts.sort_unstable();
                println!("  {:<16} {}", category, exts.join(" "));
            }
        }
    }

    Ok(())
}

/// Parse the `--progress` flag.
fn parse_progress(value: Option<&str>) -> Result<report::ReportMode> {
    match value {
        None => Ok(report::ReportMode::default_for_tty()),
        Some("off") => Ok(report::ReportMode::Off),
        Some("human") => Ok(report::ReportMode::Human),
        Some("json") => Ok(report::ReportMode::Json),
        Some(other) => bail!(
            "Unknown progress mode: '{}'. Available: off, human, json",
            other
        ),
    }
}
