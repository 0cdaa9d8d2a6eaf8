//! Cleaning options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Default glob for input discovery.
pub const DEFAULT_FILE_PATTERN: &str = "*.xlsx";

/// Policy for replacing missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Leave missing cells as they are.
    #[default]
    None,
    /// Propagate the last non-missing value downward.
    Forward,
    /// Propagate the next non-missing value upward.
    Backward,
    /// Replace missing cells with the column's zero-equivalent.
    Zero,
}

impl FillPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Zero => "zero",
        }
    }
}

impl fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillPolicy {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "forward" | "ffill" => Ok(Self::Forward),
            "backward" | "bfill" => Ok(Self::Backward),
            "zero" => Ok(Self::Zero),
            other => Err(ModelError::InvalidFillPolicy(other.to_string())),
        }
    }
}

/// Immutable options controlling discovery and the cleaning steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Columns to keep. `None` keeps every column.
    pub selected_columns: Option<Vec<String>>,
    /// Missing-value policy.
    pub fill_policy: FillPolicy,
    /// Remove rows that duplicate an earlier row across all columns.
    pub drop_duplicates: bool,
    /// File-name glob used for discovery.
    pub file_pattern: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            selected_columns: None,
            fill_policy: FillPolicy::None,
            drop_duplicates: false,
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
        }
    }
}

impl CleaningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_selected_columns(mut self, columns: Option<Vec<String>>) -> Self {
        self.selected_columns = columns;
        self
    }

    #[must_use]
    pub fn with_fill_policy(mut self, policy: FillPolicy) -> Self {
        self.fill_policy = policy;
        self
    }

    #[must_use]
    pub fn with_drop_duplicates(mut self, enable: bool) -> Self {
        self.drop_duplicates = enable;
        self
    }

    #[must_use]
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }
}
