//! Shared data model for the sheetsync pipeline.
//!
//! Every stage of the pipeline (ingest, transform, output, refresh) speaks
//! in terms of the types defined here:
//!
//! - [`CellValue`] and [`ColumnKind`]: the tagged cell representation and
//!   column-wide type inference
//! - [`SourceFrame`]: a table loaded from a single input file
//! - [`CleaningConfig`] and [`FillPolicy`]: cleaning options
//! - [`Diagnostics`]: the explicit info/warn/error sink threaded through
//!   each component
//! - [`DataSummary`]: the read-only description of a cleaned table

mod diagnostics;
mod error;
mod frame;
mod options;
mod summary;
mod value;

pub use diagnostics::{
    Diagnostic, DiagnosticLevel, Diagnostics, RecordingDiagnostics, TracingDiagnostics,
};
pub use error::{ModelError, Result};
pub use frame::{SOURCE_FILE_COLUMN, SourceFrame, cells_to_column, column_cells, any_to_cell};
pub use options::{CleaningConfig, DEFAULT_FILE_PATTERN, FillPolicy};
pub use summary::{ColumnSummary, DataSummary, SourceCount};
pub use value::{CellKey, CellValue, ColumnKind};
