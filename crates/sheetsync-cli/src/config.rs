//! Pipeline configuration file.
//!
//! One TOML file with four sections. Every key is optional; anything not
//! set falls back to the defaults below. Unknown keys are rejected so a
//! typo never silently reverts a setting to its default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sheetsync_model::{CleaningConfig, DEFAULT_FILE_PATTERN, FillPolicy};
use sheetsync_refresh::RefreshSettings;
use thiserror::Error;

use crate::logging::{LogFormat, LogLevel};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub data_processing: ProcessingConfig,
    pub logging: LoggingConfig,
    pub powerbi: PowerBiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub input_folder: PathBuf,
    pub output_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from("./raw_data/"),
            output_file: PathBuf::from("cleaned_data.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    pub file_pattern: String,
    pub selected_columns: Option<Vec<String>>,
    pub fill_na_method: FillPolicy,
    pub drop_duplicates: bool,
    /// Loader worker threads.
    pub workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            selected_columns: None,
            fill_na_method: FillPolicy::None,
            drop_duplicates: false,
            workers: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<LogLevel>,
    pub file: Option<PathBuf>,
    pub format: Option<LogFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PowerBiConfig {
    pub workspace_id: Option<String>,
    pub dataset_id: Option<String>,
    /// Trigger a refresh after a successful run.
    pub enabled: bool,
    /// Poll until the refresh finishes.
    pub wait: bool,
    pub timeout_minutes: u64,
    pub poll_interval_secs: u64,
}

impl Default for PowerBiConfig {
    fn default() -> Self {
        Self {
            workspace_id: None,
            dataset_id: None,
            enabled: true,
            wait: false,
            timeout_minutes: 15,
            poll_interval_secs: 30,
        }
    }
}

impl PowerBiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_minutes.saturating_mul(60))
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_folder: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub file_pattern: Option<String>,
    pub selected_columns: Option<Vec<String>>,
    pub fill_na_method: Option<FillPolicy>,
    pub drop_duplicates: bool,
    pub workers: Option<usize>,
    pub no_refresh: bool,
    pub wait_refresh: bool,
}

impl AppConfig {
    /// Loads the explicit path, or `config.toml` when present.
    ///
    /// A missing explicit path is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Ok((Self::from_file(path)?, ConfigSource::File(path.to_path_buf())))
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Ok((Self::from_file(path)?, ConfigSource::File(path.to_path_buf())))
                } else {
                    Ok((Self::default(), ConfigSource::Defaults))
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.data_processing.workers == 0 {
            return Err(ConfigError::Invalid(
                "data_processing.workers must be at least 1".into(),
            ));
        }
        if self.data_processing.file_pattern.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "data_processing.file_pattern must not be empty".into(),
            ));
        }
        if self.powerbi.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "powerbi.poll_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Applies command-line values on top of the file.
    pub fn apply(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(input) = overrides.input_folder {
            self.paths.input_folder = input;
        }
        if let Some(output) = overrides.output_file {
            self.paths.output_file = output;
        }
        if let Some(pattern) = overrides.file_pattern {
            self.data_processing.file_pattern = pattern;
        }
        if let Some(columns) = overrides.selected_columns {
            self.data_processing.selected_columns = Some(columns);
        }
        if let Some(fill) = overrides.fill_na_method {
            self.data_processing.fill_na_method = fill;
        }
        if overrides.drop_duplicates {
            self.data_processing.drop_duplicates = true;
        }
        if let Some(workers) = overrides.workers {
            self.data_processing.workers = workers;
        }
        if overrides.no_refresh {
            self.powerbi.enabled = false;
        }
        if overrides.wait_refresh {
            self.powerbi.wait = true;
        }
        self.validate()
    }

    pub fn cleaning_config(&self) -> CleaningConfig {
        let processing = &self.data_processing;
        CleaningConfig::new()
            .with_selected_columns(processing.selected_columns.clone())
            .with_fill_policy(processing.fill_na_method)
            .with_drop_duplicates(processing.drop_duplicates)
            .with_file_pattern(processing.file_pattern.clone())
    }

    /// Refresh target from the file, with environment variables on top.
    pub fn refresh_settings<F>(&self, lookup: F) -> RefreshSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        RefreshSettings::from_lookup(
            lookup,
            self.powerbi.workspace_id.clone(),
            self.powerbi.dataset_id.clone(),
        )
        .with_poll_interval(Duration::from_secs(self.powerbi.poll_interval_secs))
    }
}
