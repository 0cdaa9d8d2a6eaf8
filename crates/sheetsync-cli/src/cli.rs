//! CLI argument definitions for the sheetsync pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use sheetsync_model::FillPolicy;

use sheetsync_cli::config::ConfigOverrides;

#[derive(Parser)]
#[command(
    name = "sheetsync",
    version,
    about = "Consolidate a folder of spreadsheets into one clean CSV",
    long_about = "Consolidate a folder of spreadsheets into one clean CSV.\n\n\
                  Loads every matching workbook or CSV file, merges them by column name,\n\
                  applies the configured cleaning steps and writes the result. Optionally\n\
                  asks a Power BI dataset to refresh afterwards."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and the config file).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (overrides the config file).
    #[arg(long = "log-format", value_enum, global = true)]
    pub log_format: Option<LogFormatArg>,

    /// Also append logs to this file.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Configuration file (default: ./config.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline and write the cleaned CSV.
    Run(RunArgs),

    /// Load, merge, clean and summarize without writing or refreshing.
    Inspect(RunArgs),

    /// Show the latest refresh of the configured dataset.
    RefreshStatus(RefreshStatusArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Folder containing the input spreadsheets.
    #[arg(long = "input", short = 'i', value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Path of the cleaned CSV file.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// File-name glob selecting the inputs (e.g. "*.xlsx").
    #[arg(long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Columns to keep, comma separated.
    #[arg(long = "columns", value_name = "NAMES", value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Missing-value policy.
    #[arg(long = "fill", value_enum)]
    pub fill: Option<FillArg>,

    /// Drop rows that duplicate an earlier row.
    #[arg(long = "dedupe")]
    pub dedupe: bool,

    /// Number of files to parse concurrently.
    #[arg(long = "workers", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Skip the dataset refresh after writing.
    #[arg(long = "no-refresh")]
    pub no_refresh: bool,

    /// Wait for the dataset refresh to finish.
    #[arg(long = "wait-refresh", conflicts_with = "no_refresh")]
    pub wait_refresh: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_folder: self.input.clone(),
            output_file: self.output.clone(),
            file_pattern: self.pattern.clone(),
            selected_columns: self.columns.as_ref().map(|columns| {
                columns
                    .iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect()
            }),
            fill_na_method: self.fill.map(FillPolicy::from),
            drop_duplicates: self.dedupe,
            workers: self.workers.map(usize::from),
            no_refresh: self.no_refresh,
            wait_refresh: self.wait_refresh,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RefreshStatusArgs {
    /// Query a specific refresh instead of the latest one.
    #[arg(long = "refresh-id", value_name = "ID")]
    pub refresh_id: Option<String>,
}

/// CLI fill policy choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FillArg {
    None,
    Forward,
    Backward,
    Zero,
}

impl From<FillArg> for FillPolicy {
    fn from(arg: FillArg) -> Self {
        match arg {
            FillArg::None => FillPolicy::None,
            FillArg::Forward => FillPolicy::Forward,
            FillArg::Backward => FillPolicy::Backward,
            FillArg::Zero => FillPolicy::Zero,
        }
    }
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
