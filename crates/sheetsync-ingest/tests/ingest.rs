//! Discovery and loading against a real folder.

use std::path::Path;

use sheetsync_ingest::{IngestError, LoadOptions, discover_sources, load_sources};
use sheetsync_model::RecordingDiagnostics;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[test]
fn discovers_and_loads_in_name_order() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "2024_02.csv", "region,amount\nwest,5\n");
    write(dir.path(), "2024_01.csv", "region,amount\neast,1\neast,2\n");
    write(dir.path(), "readme.md", "ignored");

    let files = discover_sources(dir.path(), "*.csv").unwrap();
    let diagnostics = RecordingDiagnostics::new();
    let loaded = load_sources(&files, &LoadOptions::default(), &diagnostics).unwrap();

    let order: Vec<&str> = loaded.frames.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(order, vec!["2024_01.csv", "2024_02.csv"]);
    assert_eq!(loaded.total_rows(), 3);
    assert!(loaded.failures.is_empty());
    assert!(diagnostics.errors().is_empty());
}

#[test]
fn corrupt_workbook_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "x\n1\n");
    write(dir.path(), "b.xlsx", "corrupted bytes");

    let files = discover_sources(dir.path(), "*").unwrap();
    assert_eq!(files.len(), 2);

    let diagnostics = RecordingDiagnostics::new();
    let loaded = load_sources(&files, &LoadOptions { workers: 2 }, &diagnostics).unwrap();

    assert_eq!(loaded.frames.len(), 1);
    assert_eq!(loaded.failures.len(), 1);
    assert!(loaded.failures[0].path.ends_with("b.xlsx"));
    assert_eq!(diagnostics.errors().len(), 1);
}

#[test]
fn empty_folder_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = discover_sources(dir.path(), "*.xlsx").unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, IngestError::NoInputFiles { .. }));
}
