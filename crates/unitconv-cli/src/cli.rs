//! CLI argument definitions for the unit converter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "unitconv",
    version,
    about = "Normalize measurement columns to their preferred units",
    long_about = "Normalize measurement columns of a CSV dataset to their preferred units.\n\n\
                  Units, conversion rules, and preferred units are declared per field in a\n\
                  JSON configuration validated against a JSON Schema."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a CSV dataset to preferred units.
    Convert(ConvertArgs),

    /// Validate a conversion configuration and report every violation.
    Validate(RegistryArgs),

    /// List configured fields with their units and preferred unit.
    Fields(RegistryArgs),
}

#[derive(Parser)]
pub struct RegistryArgs {
    /// Conversion configuration (JSON).
    #[arg(long = "config", value_name = "JSON")]
    pub config: PathBuf,

    /// JSON Schema for the configuration (default: bundled schema).
    #[arg(long = "schema", value_name = "JSON")]
    pub schema: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Input dataset with a header row.
    #[arg(value_name = "INPUT_CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Output CSV path (default: <INPUT>_converted.csv next to the input).
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Fields whose unit column holds coded values instead of labels.
    #[arg(long = "coded-values", value_name = "FIELD", num_args = 1..)]
    pub coded_values: Vec<String>,

    /// Treat every field's unit column as coded values.
    #[arg(long = "all-coded")]
    pub all_coded: bool,

    /// Convert and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
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
