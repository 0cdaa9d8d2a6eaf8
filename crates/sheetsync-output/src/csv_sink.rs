//! CSV file sink.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

use crate::error::{OutputError, Result};
use crate::format::render_any;

/// Where a table was written and how much of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Writes `df` to `path` as comma-separated UTF-8.
///
/// The parent directory must already exist. An existing file is replaced.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<WrittenOutput> {
    let write_err = |source: io::Error| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    if df.width() > 0 {
        let header: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        writer
            .write_record(&header)
            .map_err(|e| write_err(io::Error::from(e)))?;

        let columns = df.get_columns();
        let mut record: Vec<String> = Vec::with_capacity(columns.len());
        for row in 0..df.height() {
            record.clear();
            for column in columns {
                record.push(render_any(column.get(row)?));
            }
            writer
                .write_record(&record)
                .map_err(|e| write_err(io::Error::from(e)))?;
        }
    }

    writer.flush().map_err(write_err)?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "wrote CSV"
    );

    Ok(WrittenOutput {
        path: path.to_path_buf(),
        rows: df.height(),
        columns: df.width(),
    })
}
