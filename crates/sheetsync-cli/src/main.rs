//! sheetsync CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use sheetsync_cli::config::{AppConfig, ConfigSource};
use sheetsync_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_consolidation, run_refresh_status};
use crate::summary::{print_refresh_status, print_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();

    let (config, source) = match AppConfig::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };

    let log_config = log_config_from_cli(&cli, &config);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "loaded configuration"),
        ConfigSource::Defaults => info!("no config file found, using defaults"),
    }

    let exit_code = match cli.command {
        Command::Run(args) => match run_consolidation(config, &args, false) {
            Ok(report) => {
                print_summary(&report);
                0
            }
            Err(error) => {
                error!("pipeline failed: {error:?}");
                1
            }
        },
        Command::Inspect(args) => match run_consolidation(config, &args, true) {
            Ok(report) => {
                print_summary(&report);
                0
            }
            Err(error) => {
                error!("inspection failed: {error:?}");
                1
            }
        },
        Command::RefreshStatus(args) => match run_refresh_status(&config, &args) {
            Ok(report) => {
                print_refresh_status(&report);
                0
            }
            Err(error) => {
                error!("refresh status unavailable: {error:?}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags, then the config file.
///
/// `--log-level` beats `-v/-q`, which beat `RUST_LOG`, which beats the
/// `[logging]` section.
fn log_config_from_cli(cli: &Cli, config: &AppConfig) -> LogConfig {
    let mut log_config = LogConfig {
        level_filter: config
            .logging
            .level
            .map_or(LevelFilter::INFO, LevelFilter::from),
        ..LogConfig::default()
    };
    log_config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if cli.verbosity.is_present() {
        log_config.level_filter = cli.verbosity.tracing_level_filter();
    }
    if let Some(level) = cli.log_level {
        log_config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    log_config.format = match cli.log_format {
        Some(LogFormatArg::Pretty) => LogFormat::Pretty,
        Some(LogFormatArg::Compact) => LogFormat::Compact,
        Some(LogFormatArg::Json) => LogFormat::Json,
        None => config.logging.format.unwrap_or_default(),
    };
    log_config.log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    log_config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => log_config.log_file.is_none() && io::stderr().is_terminal(),
    };
    log_config
}
