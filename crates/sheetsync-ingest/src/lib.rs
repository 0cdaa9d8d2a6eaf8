//! Source discovery and loading.
//!
//! This crate finds the input spreadsheets in a folder and parses each one
//! into a polars DataFrame tagged with its origin file.
//!
//! # Features
//!
//! - **Discovery**: glob match over the file names in one directory, sorted
//!   for a reproducible merge order
//! - **Workbooks**: first worksheet of `.xlsx`/`.xlsm`/`.xlsb`/`.xls`/`.ods`
//!   files via calamine
//! - **CSV**: polars CSV reader with schema inference
//! - **Loader**: per-file failure isolation and an optional bounded worker
//!   pool
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use sheetsync_ingest::{LoadOptions, discover_sources, load_sources};
//! use sheetsync_model::TracingDiagnostics;
//!
//! let files = discover_sources(Path::new("raw_data"), "*.xlsx")?;
//! let loaded = load_sources(&files, &LoadOptions::default(), &TracingDiagnostics::default())?;
//! println!("{} tables, {} skipped", loaded.frames.len(), loaded.failures.len());
//! ```

mod csv;
mod discovery;
mod error;
mod headers;
mod loader;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Discovery ===
pub use discovery::{discover_sources, list_matching_files};

// === Readers ===
pub use csv::read_csv_frame;
pub use headers::normalize_headers;
pub use workbook::read_workbook;

// === Loader ===
pub use loader::{LoadFailure, LoadOptions, LoadResult, SourceFormat, load_source, load_sources};
