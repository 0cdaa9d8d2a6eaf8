//! Pipeline orchestration for the `sheetsync` binary.
//!
//! The binary parses arguments and renders tables; everything it runs
//! lives here so integration tests can drive the same code.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
