//! treehash - deterministic content hashes for directory trees and zip uploads.
//!
//! Usage:
//!   treehash [INPUT]...           Hash directories and/or zip archives
//!   treehash -                    Hash a zip archive read from stdin
//!   treehash source FILE          Hash a JSON source descriptor
//!   treehash --help               Show help

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use treehash_aggregate::{Source, TreeAggregator, UploadedArchive};
use treehash_core::{AggregateResult, DigestAlgorithm, HashConfig, TreeHashError};

/// Input that reads an archive from stdin.
const STDIN_INPUT: &str = "-";

#[derive(Debug, Parser)]
#[command(
    name = "treehash",
    version,
    about = "Deterministic content hashes for directory trees and zip archives",
    long_about = "treehash hashes every file in a directory tree or zip archive \
                  (expanding nested archives) and folds the per-file hashes into \
                  one digest that does not depend on traversal order."
)]
struct Cli {
    /// Archive entries materialized per batch [env: TREEHASH_BATCH_SIZE]
    #[arg(short, long, global = true)]
    batch_size: Option<usize>,

    /// Digest algorithm [env: TREEHASH_ALGORITHM]
    #[arg(short, long, global = true)]
    algorithm: Option<DigestAlgorithm>,

    /// Log walker activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    hash: HashArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Arguments for hashing directories and archives.
#[derive(Debug, Args)]
struct HashArgs {
    /// Directories or zip files ("-" reads an archive from stdin)
    #[arg(default_value = ".")]
    inputs: Vec<String>,

    /// Include the per-file records
    #[arg(short, long)]
    files: bool,

    /// Output format
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hash a JSON source descriptor: a path string or an upload record
    Source {
        /// Descriptor file ("-" reads stdin)
        file: String,

        /// Include the per-file records
        #[arg(short, long)]
        files: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One hashed input, as written in JSON output.
#[derive(Serialize)]
struct InputReport<'a> {
    input: &'a str,
    #[serde(flatten)]
    result: &'a AggregateResult,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    // Usage errors exit with 1 so they never collide with the hashing codes.
    let cli = match parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            let failed = err.use_stderr();
            err.print()?;
            return Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };
    init_tracing(cli.verbose);

    let mut config = HashConfig::from_env()?;
    if let Some(batch_size) = cli.batch_size {
        config = config.with_batch_size(batch_size)?;
    }
    if let Some(algorithm) = cli.algorithm {
        config = config.with_algorithm(algorithm);
    }

    let aggregator = TreeAggregator::new(config);

    match cli.command {
        Some(Command::Source { file, files }) => run_source(&aggregator, &file, files),
        None => run_hash(
            &aggregator,
            &cli.hash.inputs,
            cli.hash.files,
            cli.hash.format,
        ),
    }
}

/// Parse arguments, rejecting combinations clap cannot express.
fn parse_cli<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let stdin_inputs = cli
        .hash
        .inputs
        .iter()
        .filter(|input| input.as_str() == STDIN_INPUT)
        .count();
    if stdin_inputs > 1 {
        return Err(Cli::command().error(
            ErrorKind::ArgumentConflict,
            "stdin (\"-\") can be given as an input only once",
        ));
    }
    Ok(cli)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Hash every input independently, in parallel.
fn run_hash(
    aggregator: &TreeAggregator,
    inputs: &[String],
    with_files: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let results: Vec<Result<AggregateResult, TreeHashError>> = inputs
        .par_iter()
        .map(|input| {
            let source = classify_input(input)?;
            aggregator.aggregate(source)
        })
        .collect();

    let mut failure: Option<u8> = None;
    let mut reports = Vec::new();

    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(result) if with_files => reports.push((input.as_str(), result)),
            Ok(result) => reports.push((input.as_str(), result.without_files())),
            Err(err) => {
                eprintln!("treehash: {input}: {err}");
                failure.get_or_insert(exit_status(&err));
            }
        }
    }

    match format {
        OutputFormat::Text => {
            for (input, result) in &reports {
                print_text(input, result);
            }
        }
        OutputFormat::Json => {
            let reports: Vec<InputReport<'_>> = reports
                .iter()
                .map(|(input, result)| InputReport { input, result })
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    Ok(failure.map_or(ExitCode::SUCCESS, ExitCode::from))
}

/// Hash a JSON source descriptor and print the result as JSON.
fn run_source(aggregator: &TreeAggregator, file: &str, with_files: bool) -> Result<ExitCode> {
    let raw = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read descriptor from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?
    };
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("Descriptor is not valid JSON")?;

    match aggregator.aggregate_value(value) {
        Ok(result) => {
            let result = if with_files { result } else { result.without_files() };
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("treehash: {file}: {err}");
            Ok(ExitCode::from(exit_status(&err)))
        }
    }
}

/// Directories are walked in place; anything else is treated as a zip file.
fn classify_input(input: &str) -> Result<Source, TreeHashError> {
    if input == STDIN_INPUT {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| TreeHashError::archive_open("stdin", e.into()))?;
        return Ok(UploadedArchive::from_bytes("stdin", bytes).into());
    }

    let path = PathBuf::from(input);
    if path.is_dir() || !path.exists() {
        // Missing paths go to the directory walker so they fail as unreadable.
        Ok(Source::Path(path))
    } else {
        Ok(UploadedArchive::on_disk(display_name(&path), path).into())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_text(input: &str, result: &AggregateResult) {
    if let Some(files) = &result.files {
        for file in files {
            println!(
                "{}  {:>10}  {}",
                file.hash,
                format_size(file.file_size),
                file.file_path
            );
        }
        eprintln!(
            "{input}: {} files, {}, {} skipped",
            files.len(),
            format_size(result.total_size().unwrap_or(0)),
            result.skipped
        );
    } else if result.skipped > 0 {
        eprintln!("{input}: {} entries skipped", result.skipped);
    }
    println!("{}  {}", result.total_hash, input);
}

/// Process exit status for a fatal hashing error.
fn exit_status(err: &TreeHashError) -> u8 {
    match err {
        TreeHashError::InvalidSourceType { .. } => 2,
        TreeHashError::ArchiveOpen { .. } => 3,
        TreeHashError::DirectoryRead { .. } => 4,
        TreeHashError::InvalidConfig { .. } => 1,
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
