//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "ecom-etl",
    version,
    about = "E-commerce reporting ETL - clean, enrich, and aggregate sales data",
    long_about = "Run the batch reporting pipeline over raw e-commerce CSV exports.\n\n\
                  Produces cleaned and enriched datasets for orders, inventory, and\n\
                  reviews plus a fixed set of aggregated business metrics, written\n\
                  as CSV and Parquet artifacts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Explicit log level (overrides -v flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Disable ANSI colors in log output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline over a data folder.
    Run(RunArgs),

    /// List the logical tables and the source files they resolve to.
    Tables(TablesArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Folder containing the raw CSV exports.
    #[arg(value_name = "DATA_FOLDER")]
    pub data_folder: PathBuf,

    /// Directory for enriched datasets (default: <DATA_FOLDER>/processed).
    #[arg(long = "processed-dir", value_name = "DIR")]
    pub processed_dir: Option<PathBuf>,

    /// Directory for aggregated metrics (default: <DATA_FOLDER>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Settings file (JSON). Missing fields fall back to defaults.
    #[arg(long = "settings", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: OutputFormatArg,

    /// Clean, enrich, and aggregate without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct TablesArgs {
    /// Settings file (JSON). Missing fields fall back to defaults.
    #[arg(long = "settings", value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Parquet,
    Both,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
