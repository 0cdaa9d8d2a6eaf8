//! Per-file loading with failure isolation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use polars::prelude::*;
use sheetsync_model::{Diagnostics, SOURCE_FILE_COLUMN, SourceFrame};

use crate::csv::read_csv_frame;
use crate::error::{IngestError, Result};
use crate::workbook::read_workbook;

/// Reader chosen for a file, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Workbook),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Loader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Upper bound on files parsed concurrently. `1` loads sequentially.
    pub workers: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// A file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of loading a batch of files.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Successfully parsed tables, in input order.
    pub frames: Vec<SourceFrame>,
    /// Files that were skipped, in input order.
    pub failures: Vec<LoadFailure>,
}

impl LoadResult {
    pub fn total_rows(&self) -> usize {
        self.frames.iter().map(SourceFrame::record_count).sum()
    }
}

/// Parses one file and tags every row with its base name.
///
/// An existing `source_file` column is overwritten.
pub fn load_source(path: &Path) -> Result<SourceFrame> {
    let format = SourceFormat::detect(path).ok_or_else(|| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let data = match format {
        SourceFormat::Workbook => read_workbook(path)?,
        SourceFormat::Csv => read_csv_frame(path)?,
    };

    let mut frame = SourceFrame::new(path, data);
    let tag = Series::new(
        SOURCE_FILE_COLUMN.into(),
        vec![frame.file_name.as_str(); frame.data.height()],
    );
    if frame.data.column(SOURCE_FILE_COLUMN).is_ok() {
        frame.data.drop_in_place(SOURCE_FILE_COLUMN)?;
    }
    frame.data.with_column(tag)?;
    Ok(frame)
}

/// Loads every file, skipping the ones that fail.
///
/// Each failure is reported to `diagnostics` as an error and collected in
/// [`LoadResult::failures`]. Fails with [`IngestError::NoValidData`] only
/// when every file failed.
pub fn load_sources(
    paths: &[PathBuf],
    options: &LoadOptions,
    diagnostics: &dyn Diagnostics,
) -> Result<LoadResult> {
    let outcomes: Vec<Result<SourceFrame>> = if options.workers <= 1 || paths.len() <= 1 {
        paths.iter().map(|path| load_source(path)).collect()
    } else {
        load_parallel(paths, options.workers)
    };

    let mut frames = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for (path, outcome) in paths.iter().zip(outcomes) {
        match outcome {
            Ok(frame) => {
                diagnostics.info(&format!(
                    "loaded {} ({} rows)",
                    frame.file_name,
                    frame.record_count()
                ));
                frames.push(frame);
            }
            Err(err) => {
                diagnostics.error(&format!("failed to read {}: {err}", path.display()));
                failures.push(LoadFailure {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if frames.is_empty() && !paths.is_empty() {
        return Err(IngestError::NoValidData {
            attempted: paths.len(),
        });
    }

    Ok(LoadResult { frames, failures })
}

/// Parses files on up to `workers` scoped threads.
///
/// Results are returned in input order.
fn load_parallel(paths: &[PathBuf], workers: usize) -> Vec<Result<SourceFrame>> {
    let next = AtomicUsize::new(0);
    let worker_count = workers.min(paths.len());

    let mut indexed: Vec<(usize, Result<SourceFrame>)> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                s.spawn(|| {
                    let mut done = Vec::new();
                    loop {
                        let idx = next.fetch_add(1, Ordering::Relaxed);
                        let Some(path) = paths.get(idx) else {
                            break;
                        };
                        done.push((idx, load_source(path)));
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(done) => done,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, outcome)| outcome).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsync_model::RecordingDiagnostics;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn detects_formats() {
        assert_eq!(
            SourceFormat::detect(Path::new("a/Sales.XLSX")),
            Some(SourceFormat::Workbook)
        );
        assert_eq!(
            SourceFormat::detect(Path::new("b.ods")),
            Some(SourceFormat::Workbook)
        );
        assert_eq!(SourceFormat::detect(Path::new("c.csv")), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::detect(Path::new("d.txt")), None);
        assert_eq!(SourceFormat::detect(Path::new("noext")), None);
    }

    #[test]
    fn load_source_tags_rows() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "east.csv", "region,amount\neast,1\neast,2\n");

        let frame = load_source(&path).unwrap();
        assert_eq!(frame.file_name, "east.csv");
        assert_eq!(frame.record_count(), 2);
        assert_eq!(frame.data_columns(), vec!["region", "amount"]);

        let tag = frame.data.column(SOURCE_FILE_COLUMN).unwrap();
        assert_eq!(tag.get(1).unwrap(), AnyValue::String("east.csv"));
    }

    #[test]
    fn load_source_overwrites_existing_tag() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tagged.csv", "source_file,x\nother.xlsx,1\n");

        let frame = load_source(&path).unwrap();
        assert_eq!(frame.data.width(), 2);
        let tag = frame.data.column(SOURCE_FILE_COLUMN).unwrap();
        assert_eq!(tag.get(0).unwrap(), AnyValue::String("tagged.csv"));
    }

    #[test]
    fn unsupported_extension_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.txt", "hello");
        assert!(matches!(
            load_source(&path),
            Err(IngestError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn load_sources_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "a.csv", "x\n1\n");
        let bad = write(&dir, "b.xlsx", "not a workbook");
        let diagnostics = RecordingDiagnostics::new();

        let result = load_sources(
            &[good, bad.clone()],
            &LoadOptions::default(),
            &diagnostics,
        )
        .unwrap();

        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].path, bad);
        assert_eq!(diagnostics.errors().len(), 1);
        assert!(diagnostics.errors()[0].contains("b.xlsx"));
    }

    #[test]
    fn load_sources_all_failed() {
        let dir = TempDir::new().unwrap();
        let bad = write(&dir, "b.xlsx", "not a workbook");
        let diagnostics = RecordingDiagnostics::new();

        let result = load_sources(&[bad], &LoadOptions::default(), &diagnostics);
        assert!(matches!(
            result,
            Err(IngestError::NoValidData { attempted: 1 })
        ));
    }

    #[test]
    fn parallel_load_keeps_input_order() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..6)
            .map(|i| write(&dir, &format!("f{i}.csv"), &format!("n\n{i}\n")))
            .collect();
        let diagnostics = RecordingDiagnostics::new();

        let result = load_sources(&paths, &LoadOptions { workers: 3 }, &diagnostics).unwrap();
        let names: Vec<&str> = result.frames.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["f0.csv", "f1.csv", "f2.csv", "f3.csv", "f4.csv", "f5.csv"]
        );
        assert_eq!(result.total_rows(), 6);
    }
}
