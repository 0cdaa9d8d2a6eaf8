//! Error types for refresh notifications.

use thiserror::Error;

/// Errors that can occur while talking to the refresh API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RefreshError {
    /// One or more required settings are not set.
    #[error("missing refresh settings: {}", .missing.join(", "))]
    MissingCredentials {
        /// Names of the missing settings.
        missing: Vec<&'static str>,
    },

    /// Request could not be sent or the response not read.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with an unexpected status.
    #[error("refresh API returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("invalid refresh API response: {0}")]
    InvalidResponse(String),
}

impl RefreshError {
    /// Returns whether polling again might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::InvalidResponse(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredentials { .. } => false,
        }
    }
}

/// Result type for refresh operations.
pub type Result<T> = std::result::Result<T, RefreshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_lists_names() {
        let err = RefreshError::MissingCredentials {
            missing: vec!["POWERBI_ACCESS_TOKEN", "dataset_id"],
        };
        assert_eq!(
            err.to_string(),
            "missing refresh settings: POWERBI_ACCESS_TOKEN, dataset_id"
        );
        assert!(!err.is_transient());
    }

    #[test]
    fn server_errors_are_transient() {
        let err = RefreshError::Api {
            status: 503,
            message: "busy".into(),
        };
        assert!(err.is_transient());
        let err = RefreshError::Api {
            status: 401,
            message: "unauthorized".into(),
        };
        assert!(!err.is_transient());
    }
}
