//! Table transformations for the consolidation pipeline.
//!
//! - [`merge_frames`]: concatenate per-file tables by column name
//! - [`clean_table`]: projection, fill, deduplication and type normalization
//! - [`summarize`]: read-only description of a table

mod clean;
mod error;
mod merge;
mod normalize;
mod summary;

pub use clean::{
    CleaningReport, Projection, clean_table, drop_duplicate_rows, fill_cells, fill_missing,
    project_columns,
};
pub use error::{Result, TransformError};
pub use merge::merge_frames;
pub use normalize::{ColumnRetype, normalize_types, smallest_integer_dtype};
pub use summary::summarize;
