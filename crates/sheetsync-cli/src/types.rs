use std::path::PathBuf;
use std::time::Duration;

use sheetsync_ingest::LoadFailure;
use sheetsync_model::DataSummary;
use sheetsync_output::WrittenOutput;
use sheetsync_refresh::RefreshOutcome;
use sheetsync_transform::CleaningReport;

#[derive(Debug)]
pub struct RunReport {
    pub input_folder: PathBuf,
    pub files_found: usize,
    pub files_loaded: usize,
    pub failures: Vec<LoadFailure>,
    /// Rows before cleaning.
    pub merged_rows: usize,
    pub cleaning: CleaningReport,
    pub summary: DataSummary,
    /// `None` for dry runs.
    pub output: Option<WrittenOutput>,
    /// `None` when refresh is disabled or the run was a dry run.
    pub refresh: Option<RefreshOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn files_skipped(&self) -> usize {
        self.failures.len()
    }
}
