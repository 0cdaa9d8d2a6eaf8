//! CSV file reading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::headers::normalize_headers;

/// Detect encoding and validate it's supported (UTF-8 only).
///
/// Checks for UTF-16 BOM markers which are not supported.
fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    Ok(())
}

/// Rows sampled for the first schema inference pass.
const INFER_SCHEMA_ROWS: usize = 100;

fn read_with_inference(path: &Path, infer_rows: Option<usize>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_rows)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

/// Reads a CSV file with one header row into a Polars DataFrame.
///
/// Column types are inferred from the first 100 rows. When a later value
/// does not fit the sampled type, the file is read again with every row
/// inferred, so a column with disagreeing values comes back as text.
/// Header names are normalized the same way as workbook headers.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    validate_encoding(path)?;

    let mut df = match read_with_inference(path, Some(INFER_SCHEMA_ROWS)) {
        Ok(df) => df,
        Err(first) => {
            tracing::debug!(
                path = %path.display(),
                error = %first,
                "sampled schema did not fit, inferring from all rows"
            );
            read_with_inference(path, None).map_err(|e| IngestError::CsvParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        }
    };

    let current: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let raw: Vec<&str> = current
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}'))
        .collect();
    let normalized = normalize_headers(&raw);
    if normalized != current {
        df.set_column_names(normalized.iter().map(String::as_str))?;
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|n| n.to_string()).collect()
    }

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_frame() {
        let file = create_temp_csv(b"region,amount\nnorth,10\nsouth,20\n");
        let df = read_csv_frame(file.path()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(names(&df), vec!["region", "amount"]);
        assert_eq!(df.column("amount").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_read_csv_frame_late_text_falls_back_to_string() {
        let mut content = String::from("row,qty\n");
        for i in 0..150 {
            content.push_str(&format!("{i},{i}\n"));
        }
        content.push_str("150,N/A\n");
        let file = create_temp_csv(content.as_bytes());

        let df = read_csv_frame(file.path()).unwrap();

        assert_eq!(df.height(), 151);
        assert_eq!(df.column("row").unwrap().dtype(), &DataType::Int64);
        let qty = df.column("qty").unwrap();
        assert_eq!(qty.dtype(), &DataType::String);
        assert_eq!(qty.get(150).unwrap(), AnyValue::String("N/A"));
        assert_eq!(qty.get(0).unwrap(), AnyValue::String("0"));
    }

    #[test]
    fn test_read_csv_frame_with_bom() {
        let file = create_temp_csv("\u{feff}A,B\n1,2\n".as_bytes());
        let df = read_csv_frame(file.path()).unwrap();
        assert_eq!(names(&df), vec!["A", "B"]);
    }

    #[test]
    fn test_read_csv_frame_rejects_utf16() {
        let file = create_temp_csv(&[0xFF, 0xFE, b'A', 0x00]);
        let result = read_csv_frame(file.path());
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            })
        ));
    }
}
