//! Consolidation pipeline with explicit stages.
//!
//! The pipeline runs these stages in order:
//! 1. **Discover**: match input files in the configured folder
//! 2. **Load**: parse each file, skipping the ones that fail
//! 3. **Merge**: concatenate the per-file tables by column name
//! 4. **Clean**: projection, fill, deduplication, type normalization
//! 5. **Summarize**: shape, null counts and per-source row counts
//! 6. **Write**: persist the cleaned table as CSV
//! 7. **Refresh**: ask the downstream dataset to refresh (best effort)
//!
//! Stages 1-6 abort the run on a fatal error. Stage 7 never does.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use sheetsync_ingest::{LoadOptions, LoadResult, discover_sources, load_sources};
use sheetsync_model::{CleaningConfig, DataSummary, Diagnostics};
use sheetsync_output::{WrittenOutput, write_csv};
use sheetsync_refresh::{RefreshNotifier, RefreshOutcome, RefreshSettings};
use sheetsync_transform::{CleaningReport, clean_table, merge_frames, summarize};

use crate::config::AppConfig;
use crate::types::RunReport;

/// Refresh to request once the output is written.
#[derive(Debug, Clone)]
pub struct RefreshPlan {
    pub settings: RefreshSettings,
    /// Poll until finished, giving up after this long.
    pub wait: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Skip the write and refresh stages.
    pub dry_run: bool,
    pub refresh: Option<RefreshPlan>,
}

impl PipelineOptions {
    /// Options derived from the `[powerbi]` section.
    pub fn from_config<F>(config: &AppConfig, dry_run: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let refresh = (config.powerbi.enabled && !dry_run).then(|| RefreshPlan {
            settings: config.refresh_settings(lookup),
            wait: config.powerbi.wait.then(|| config.powerbi.timeout()),
        });
        Self { dry_run, refresh }
    }
}

/// Runs every stage and returns what happened.
pub fn run_pipeline(
    config: &AppConfig,
    options: &PipelineOptions,
    diagnostics: Arc<dyn Diagnostics>,
) -> Result<RunReport> {
    let started = Instant::now();
    let input_folder = config.paths.input_folder.clone();
    let cleaning_config = config.cleaning_config();

    // =========================================================================
    // Stage 1-2: Discover and load
    // =========================================================================
    let files = discover(&input_folder, &cleaning_config)?;
    let load_options = LoadOptions {
        workers: config.data_processing.workers,
    };
    let loaded = load(&files, &load_options, diagnostics.as_ref())?;

    // =========================================================================
    // Stage 3-5: Merge, clean, summarize
    // =========================================================================
    let merged = merge(&loaded)?;
    let merged_rows = merged.height();
    drop(loaded.frames);

    let (cleaned, cleaning) = clean(merged, &cleaning_config, diagnostics.as_ref())?;
    let summary = summary(&cleaned)?;

    // =========================================================================
    // Stage 6-7: Write and refresh
    // =========================================================================
    let mut output = None;
    let mut refresh = None;
    if !options.dry_run {
        output = Some(write(&cleaned, &config.paths.output_file)?);
        if let Some(plan) = &options.refresh {
            refresh = Some(notify(plan, Arc::clone(&diagnostics)));
        }
    }

    Ok(RunReport {
        input_folder,
        files_found: files.len(),
        files_loaded: files.len() - loaded.failures.len(),
        failures: loaded.failures,
        merged_rows,
        cleaning,
        summary,
        output,
        refresh,
        elapsed: started.elapsed(),
    })
}

fn discover(dir: &Path, config: &CleaningConfig) -> Result<Vec<PathBuf>> {
    let span = info_span!("discover", dir = %dir.display(), pattern = %config.file_pattern);
    let _guard = span.enter();
    let files = discover_sources(dir, &config.file_pattern)
        .with_context(|| format!("discover input files in {}", dir.display()))?;
    info!(count = files.len(), "found input files");
    Ok(files)
}

fn load(
    files: &[PathBuf],
    options: &LoadOptions,
    diagnostics: &dyn Diagnostics,
) -> Result<LoadResult> {
    let span = info_span!("load", files = files.len(), workers = options.workers);
    let _guard = span.enter();
    let start = Instant::now();
    let loaded = load_sources(files, options, diagnostics).context("load input files")?;
    info!(
        loaded = loaded.frames.len(),
        skipped = loaded.failures.len(),
        rows = loaded.total_rows(),
        duration_ms = start.elapsed().as_millis(),
        "load complete"
    );
    Ok(loaded)
}

fn merge(loaded: &LoadResult) -> Result<DataFrame> {
    let span = info_span!("merge", tables = loaded.frames.len());
    let _guard = span.enter();
    let merged = merge_frames(&loaded.frames).context("merge tables")?;
    info!(
        rows = merged.height(),
        columns = merged.width(),
        "merged tables"
    );
    Ok(merged)
}

fn clean(
    merged: DataFrame,
    config: &CleaningConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<(DataFrame, CleaningReport)> {
    let span = info_span!("clean", fill = %config.fill_policy, dedupe = config.drop_duplicates);
    let _guard = span.enter();
    let start = Instant::now();
    let (cleaned, report) = clean_table(merged, config, diagnostics).context("clean table")?;
    info!(
        rows = cleaned.height(),
        columns = cleaned.width(),
        filled = report.cells_filled,
        duplicates = report.duplicates_removed,
        retyped = report.retyped.len(),
        duration_ms = start.elapsed().as_millis(),
        "cleaning complete"
    );
    Ok((cleaned, report))
}

fn summary(cleaned: &DataFrame) -> Result<DataSummary> {
    let summary = summarize(cleaned).context("summarize table")?;
    match serde_json::to_string(&summary) {
        Ok(json) => info!(summary = %json, "data summary"),
        Err(err) => warn!(error = %err, "could not serialize data summary"),
    }
    Ok(summary)
}

fn write(cleaned: &DataFrame, path: &Path) -> Result<WrittenOutput> {
    let span = info_span!("write", path = %path.display());
    let _guard = span.enter();
    let written =
        write_csv(cleaned, path).with_context(|| format!("write output {}", path.display()))?;
    info!(rows = written.rows, columns = written.columns, "output written");
    Ok(written)
}

fn notify(plan: &RefreshPlan, diagnostics: Arc<dyn Diagnostics>) -> RefreshOutcome {
    let span = info_span!("refresh");
    let _guard = span.enter();
    let notifier = match RefreshNotifier::new(plan.settings.clone(), diagnostics) {
        Ok(notifier) => notifier,
        Err(err) => {
            warn!(error = %err, "refresh client unavailable");
            return RefreshOutcome::Failed(err.to_string());
        }
    };

    let outcome = match (notifier.trigger_refresh(), plan.wait) {
        (RefreshOutcome::Triggered, Some(timeout)) => notifier.wait_for_completion(timeout),
        (outcome, _) => outcome,
    };
    if let RefreshOutcome::Failed(reason) = &outcome {
        warn!(%reason, "dataset refresh failed; cleaned output is still in place");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_never_plans_a_refresh() {
        let config = AppConfig::default();
        let options = PipelineOptions::from_config(&config, true, |_| None);
        assert!(options.dry_run);
        assert!(options.refresh.is_none());
    }

    #[test]
    fn wait_uses_configured_timeout() {
        let mut config = AppConfig::default();
        config.powerbi.wait = true;
        config.powerbi.timeout_minutes = 3;
        let options = PipelineOptions::from_config(&config, false, |_| None);
        let plan = options.refresh.unwrap();
        assert_eq!(plan.wait, Some(Duration::from_secs(180)));
    }

    #[test]
    fn disabled_refresh_is_skipped() {
        let mut config = AppConfig::default();
        config.powerbi.enabled = false;
        let options = PipelineOptions::from_config(&config, false, |_| None);
        assert!(options.refresh.is_none());
    }
}
