//! gridlint - reveal the formula structure of a spreadsheet

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use gridlint_core::{AnalysisConfig, Sheet, storage};
use gridlint_engine::engine::{CellRef, extract_with_options, fingerprint};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridlint")]
#[command(
    author,
    version,
    about = "Fingerprint spreadsheet formulas by the shape of their references"
)]
struct Cli {
    /// Log more (-v debug, -vv trace). RUST_LOG applies when not given.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: gridlint/config.toml in the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fingerprint every formula in a sheet and group equal ones into ranges
    Analyze {
        /// Formula grid: extracted workbook JSON (.json) or CSV
        input: PathBuf,

        /// Only analyze the sheet with this name
        #[arg(short, long)]
        sheet: Option<String>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = Format::Md)]
        format: Format,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Adjacency tolerance for merging ranges
        #[arg(long)]
        tolerance: Option<u32>,

        /// Run on a single thread
        #[arg(long)]
        no_parallel: bool,

        /// Ignore references inside string literals
        #[arg(long)]
        skip_strings: bool,
    },

    /// Print the dependency vector and fingerprint of a single formula
    Fingerprint {
        /// Formula text, e.g. "=SUM(A1:B3)"
        formula: String,

        /// Cell holding the formula
        #[arg(long, default_value = "A1")]
        at: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Md,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AnalysisConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Analyze {
            input,
            sheet,
            format,
            output,
            tolerance,
            no_parallel,
            skip_strings,
        } => {
            if let Some(tolerance) = tolerance {
                config.merge_tolerance = tolerance;
            }
            config.parallel &= !no_parallel;
            config.skip_string_literals |= skip_strings;
            analyze(&input, sheet.as_deref(), format, output.as_deref(), &config)
        }
        Commands::Fingerprint { formula, at } => show_fingerprint(&formula, &at, &config),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn analyze(
    input: &Path,
    sheet: Option<&str>,
    format: Format,
    output: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<()> {
    let sheets = Sheet::load_all(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let sheets = Sheet::select(sheets, sheet)?;
    tracing::debug!(sheets = sheets.len(), ?config, "analyzing");
    let analyses: Vec<_> = sheets.iter().map(|s| s.analyze(config)).collect();

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    match format {
        Format::Md => storage::write_markdown(&mut writer, &analyses)?,
        Format::Json => storage::write_json(&mut writer, &analyses)?,
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn show_fingerprint(formula: &str, at: &str, config: &AnalysisConfig) -> Result<()> {
    let origin: CellRef = at
        .parse()
        .with_context(|| format!("Invalid --at cell: {at}"))?;
    let vector = extract_with_options(formula, origin, &config.extract_options())
        .with_context(|| format!("Cannot fingerprint {formula}"))?;
    println!("{} {}", vector, fingerprint(&vector));
    Ok(())
}
