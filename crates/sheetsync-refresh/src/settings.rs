//! Connection settings for the refresh API.

use std::fmt;
use std::time::Duration;

/// Power BI REST API root.
pub const DEFAULT_BASE_URL: &str = "https://api.powerbi.com/v1.0/myorg";

/// Delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the bearer token.
pub const ACCESS_TOKEN_ENV: &str = "POWERBI_ACCESS_TOKEN";
/// Environment variable overriding the workspace id.
pub const WORKSPACE_ID_ENV: &str = "POWERBI_WORKSPACE_ID";
/// Environment variable overriding the dataset id.
pub const DATASET_ID_ENV: &str = "POWERBI_DATASET_ID";

/// Target dataset and credentials.
///
/// The access token never comes from a config file; see
/// [`RefreshSettings::from_lookup`].
#[derive(Clone)]
pub struct RefreshSettings {
    pub base_url: String,
    pub workspace_id: Option<String>,
    pub dataset_id: Option<String>,
    pub access_token: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workspace_id: None,
            dataset_id: None,
            access_token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RefreshSettings {
    /// Builds settings from a variable lookup such as `std::env::var`.
    ///
    /// Workspace and dataset ids from the lookup take precedence over the
    /// given defaults. Blank values count as unset.
    pub fn from_lookup<F>(
        lookup: F,
        workspace_id: Option<String>,
        dataset_id: Option<String>,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            workspace_id: read(WORKSPACE_ID_ENV).or(workspace_id),
            dataset_id: read(DATASET_ID_ENV).or(dataset_id),
            access_token: read(ACCESS_TOKEN_ENV),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_workspace_id(mut self, id: impl Into<String>) -> Self {
        self.workspace_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_dataset_id(mut self, id: impl Into<String>) -> Self {
        self.dataset_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Names of required settings that are unset or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.workspace_id) {
            missing.push("workspace_id");
        }
        if blank(&self.dataset_id) {
            missing.push("dataset_id");
        }
        if blank(&self.access_token) {
            missing.push(ACCESS_TOKEN_ENV);
        }
        missing
    }

    pub(crate) fn refreshes_url(&self, workspace_id: &str, dataset_id: &str) -> String {
        format!(
            "{}/groups/{workspace_id}/datasets/{dataset_id}/refreshes",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl fmt::Debug for RefreshSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshSettings")
            .field("base_url", &self.base_url)
            .field("workspace_id", &self.workspace_id)
            .field("dataset_id", &self.dataset_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn environment_overrides_file_ids() {
        let settings = RefreshSettings::from_lookup(
            lookup(&[(WORKSPACE_ID_ENV, "ws-env"), (ACCESS_TOKEN_ENV, "t")]),
            Some("ws-file".into()),
            Some("ds-file".into()),
        );
        assert_eq!(settings.workspace_id.as_deref(), Some("ws-env"));
        assert_eq!(settings.dataset_id.as_deref(), Some("ds-file"));
        assert!(settings.missing().is_empty());
    }

    #[test]
    fn blank_values_are_missing() {
        let settings = RefreshSettings::from_lookup(
            lookup(&[(ACCESS_TOKEN_ENV, "  ")]),
            Some("ws".into()),
            None,
        );
        assert_eq!(settings.missing(), vec!["dataset_id", ACCESS_TOKEN_ENV]);
    }

    #[test]
    fn debug_hides_token() {
        let settings = RefreshSettings::default().with_access_token("secret-token");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn url_layout() {
        let settings = RefreshSettings::default().with_base_url("http://localhost:1/");
        assert_eq!(
            settings.refreshes_url("w", "d"),
            "http://localhost:1/groups/w/datasets/d/refreshes"
        );
    }
}
