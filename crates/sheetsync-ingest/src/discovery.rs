//! File discovery for input folders.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{IngestError, Result};

/// Lists the regular files in `dir` whose name matches `pattern`.
///
/// The glob is matched against the file name only, case-insensitively.
/// Subdirectories are not searched. Returns files sorted by filename.
pub fn list_matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let matcher = compile_pattern(pattern)?;
    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() {
            continue;
        }

        let matched = path
            .file_name()
            .map(|name| matcher.is_match(name))
            .unwrap_or(false);

        if matched {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Like [`list_matching_files`], but an empty result is an error.
pub fn discover_sources(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let files = list_matching_files(dir, pattern)?;
    if files.is_empty() {
        return Err(IngestError::NoInputFiles {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }
    tracing::debug!(
        dir = %dir.display(),
        pattern,
        count = files.len(),
        "discovered input files"
    );
    Ok(files)
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| IngestError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        for name in &["sales_q2.xlsx", "sales_q1.XLSX", "notes.txt", "extra.csv"] {
            std::fs::write(dir.path().join(name), "data").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.xlsx")).unwrap();

        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_list_matching_files_sorted_case_insensitive() {
        let dir = create_test_dir();
        let files = list_matching_files(dir.path(), "*.xlsx").unwrap();

        assert_eq!(names(&files), vec!["sales_q1.XLSX", "sales_q2.xlsx"]);
    }

    #[test]
    fn test_list_matching_files_other_pattern() {
        let dir = create_test_dir();
        let files = list_matching_files(dir.path(), "*.csv").unwrap();
        assert_eq!(names(&files), vec!["extra.csv"]);
    }

    #[test]
    fn test_discover_sources_empty_dir() {
        let dir = TempDir::new().unwrap();
        let result = discover_sources(dir.path(), "*.xlsx");
        assert!(matches!(result, Err(IngestError::NoInputFiles { .. })));
    }

    #[test]
    fn test_discover_sources_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("test.xlsx");
        std::fs::write(&file_path, "data").unwrap();

        let result = discover_sources(&file_path, "*.xlsx");
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        let result = list_matching_files(dir.path(), "[unclosed");
        assert!(matches!(result, Err(IngestError::InvalidPattern { .. })));
    }
}
