use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown fill policy '{0}' (expected none, forward, backward or zero)")]
    InvalidFillPolicy(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
