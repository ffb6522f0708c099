//! CLI argument definitions for colmatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "colmatch",
    version,
    about = "Interactive column matching between a source table and a target schema",
    long_about = "Propose and review mappings from source table columns to target schema columns.\n\n\
                  Candidates come from several matchers whose weights adapt to\n\
                  accept and reject decisions."
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

    /// Allow column values in trace logs (redacted otherwise).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate candidates and print them with the matcher weights.
    Candidates(CandidatesArgs),

    /// Apply a JSON review script and print the resulting history.
    Review(ReviewArgs),

    /// Show unique values and value bins of one column.
    Values(ValuesArgs),
}

/// Inputs and configuration shared by every command.
#[derive(Args)]
pub struct InputArgs {
    /// Source table (CSV with header row).
    #[arg(value_name = "SOURCE_CSV")]
    pub source: PathBuf,

    /// Target data dictionary (.json) or target table (CSV).
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Matching configuration file (JSON). Flags below override it.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Session name; also names the persisted candidate file.
    #[arg(long = "session", default_value = "default")]
    pub session: String,

    /// Directory for persisted candidates and explanations.
    #[arg(long = "cache-dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Matchers to run (comma separated).
    #[arg(long = "matchers", value_delimiter = ',', value_name = "NAMES")]
    pub matchers: Option<Vec<String>>,

    /// Ground-truth mapping CSV (source,target); enables the groundtruth matcher.
    #[arg(long = "groundtruth", value_name = "PATH")]
    pub groundtruth: Option<PathBuf>,

    /// Candidates kept per source column and matcher.
    #[arg(long = "top-k")]
    pub top_k: Option<usize>,

    /// Keep matcher weights fixed during review.
    #[arg(long = "no-weight-updates")]
    pub no_weight_updates: bool,
}

#[derive(Args)]
pub struct CandidatesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Ignore cached candidates and regenerate.
    #[arg(long = "fresh")]
    pub fresh: bool,

    /// Print the frontend payload as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Review script: JSON array of accept/reject/discard/undo/redo steps.
    #[arg(long = "script", value_name = "PATH")]
    pub script: PathBuf,

    /// Write the accepted columns, renamed to their targets, as CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Write the accepted source/target pairs as JSON.
    #[arg(long = "export-mappings", value_name = "PATH")]
    pub export_mappings: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValuesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Column to describe.
    #[arg(long = "column")]
    pub column: String,

    /// Which table the column belongs to.
    #[arg(long = "side", value_enum, default_value = "source")]
    pub side: SideArg,

    /// Maximum number of unique values to list.
    #[arg(long = "limit", default_value_t = 20)]
    pub limit: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SideArg {
    Source,
    Target,
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
