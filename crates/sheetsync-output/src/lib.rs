//! Persistence of cleaned tables.
//!
//! The only sink is comma-separated UTF-8 text: a header row of column
//! names, then one row per record.

mod csv_sink;
mod error;
mod format;

pub use csv_sink::{WrittenOutput, write_csv};
pub use error::{OutputError, Result};
pub use format::render_any;
