use thiserror::Error;

/// Errors raised by the merge and cleaning steps.
///
/// Ordinary data variance never fails; only polars internals surface here.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
