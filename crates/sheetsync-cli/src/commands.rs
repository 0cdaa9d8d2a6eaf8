use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use sheetsync_cli::config::AppConfig;
use sheetsync_cli::pipeline::{PipelineOptions, run_pipeline};
use sheetsync_cli::types::RunReport;
use sheetsync_model::TracingDiagnostics;
use sheetsync_refresh::{RefreshNotifier, RefreshStatusReport};

use crate::cli::{RefreshStatusArgs, RunArgs};

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// `run` and `inspect`: apply the flags on top of the file and run.
pub fn run_consolidation(
    mut config: AppConfig,
    args: &RunArgs,
    dry_run: bool,
) -> Result<RunReport> {
    config
        .apply(args.overrides())
        .context("apply command-line options")?;
    let options = PipelineOptions::from_config(&config, dry_run, env_lookup);
    if options.refresh.is_none() && !dry_run {
        info!("dataset refresh disabled");
    }
    run_pipeline(
        &config,
        &options,
        Arc::new(TracingDiagnostics::new("pipeline")),
    )
}

pub fn run_refresh_status(
    config: &AppConfig,
    args: &RefreshStatusArgs,
) -> Result<RefreshStatusReport> {
    let settings = config.refresh_settings(env_lookup);
    let notifier = RefreshNotifier::new(settings, Arc::new(TracingDiagnostics::new("refresh")))
        .context("create refresh client")?;
    notifier
        .refresh_status(args.refresh_id.as_deref())
        .context("query dataset refresh status")
}
