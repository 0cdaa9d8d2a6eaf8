//! Blocking client for dataset refresh requests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use sheetsync_model::Diagnostics;
use tracing::debug;

use crate::error::{RefreshError, Result};
use crate::settings::RefreshSettings;
use crate::status::{RefreshStatus, RefreshStatusReport, parse_status_body};

/// Result of a best-effort refresh operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The service accepted the refresh request.
    Triggered,
    /// The refresh finished successfully.
    Completed,
    /// The operation failed; the pipeline carries on.
    Failed(String),
}

impl RefreshOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Short label for summaries.
    pub fn label(&self) -> String {
        match self {
            Self::Triggered => "triggered".to_string(),
            Self::Completed => "completed".to_string(),
            Self::Failed(reason) => format!("failed: {reason}"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    notify_option: &'static str,
}

/// Ids and token checked to be present.
struct Target<'a> {
    workspace_id: &'a str,
    dataset_id: &'a str,
    token: &'a str,
}

/// Triggers and polls refreshes of one dataset.
///
/// Every public operation reports through the diagnostics sink and returns
/// a value; none of them panic or abort the caller.
pub struct RefreshNotifier {
    settings: RefreshSettings,
    client: Client,
    diagnostics: Arc<dyn Diagnostics>,
}

impl RefreshNotifier {
    /// Create a notifier. Fails only if the HTTP client cannot be built.
    pub fn new(settings: RefreshSettings, diagnostics: Arc<dyn Diagnostics>) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        Ok(Self {
            settings,
            client,
            diagnostics,
        })
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    /// Asks the service to refresh the dataset.
    ///
    /// Success means the request was accepted (`202`), not that the
    /// refresh finished.
    pub fn trigger_refresh(&self) -> RefreshOutcome {
        match self.try_trigger() {
            Ok(()) => {
                self.diagnostics.info("dataset refresh triggered");
                RefreshOutcome::Triggered
            }
            Err(err) => {
                self.diagnostics
                    .error(&format!("failed to trigger dataset refresh: {err}"));
                RefreshOutcome::Failed(err.to_string())
            }
        }
    }

    fn try_trigger(&self) -> Result<()> {
        let target = self.target()?;
        let url = self
            .settings
            .refreshes_url(target.workspace_id, target.dataset_id);
        debug!(dataset = target.dataset_id, "triggering dataset refresh");

        let response = self
            .client
            .post(url)
            .bearer_auth(target.token)
            .json(&RefreshRequest {
                notify_option: "MailOnFailure",
            })
            .send()
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::ACCEPTED {
            return Ok(());
        }
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(RefreshError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetches the latest refresh, or a specific one by id.
    pub fn refresh_status(&self, refresh_id: Option<&str>) -> Result<RefreshStatusReport> {
        let target = self.target()?;
        let mut url = self
            .settings
            .refreshes_url(target.workspace_id, target.dataset_id);
        if let Some(id) = refresh_id {
            url.push('/');
            url.push_str(id);
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(target.token)
            .send()
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RefreshError::Network(e.to_string()))?;
        if status != StatusCode::OK {
            return Err(RefreshError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed = parse_status_body(&body)?;
        if let Some(raw) = parsed.unrecognised {
            self.diagnostics
                .warn(&format!("unrecognised refresh status '{raw}', treating as unknown"));
        }
        Ok(parsed.report)
    }

    /// Polls the latest refresh until it finishes or `timeout` elapses.
    pub fn wait_for_completion(&self, timeout: Duration) -> RefreshOutcome {
        let started = Instant::now();
        self.diagnostics.info(&format!(
            "waiting for dataset refresh to complete (timeout: {})",
            describe_duration(timeout)
        ));

        loop {
            match self.refresh_status(None) {
                Ok(report) => match report.status {
                    RefreshStatus::Completed => {
                        self.diagnostics.info("dataset refresh completed");
                        return RefreshOutcome::Completed;
                    }
                    RefreshStatus::Failed => {
                        let reason = report.failure_reason();
                        self.diagnostics
                            .error(&format!("dataset refresh failed: {reason}"));
                        return RefreshOutcome::Failed(reason);
                    }
                    RefreshStatus::Unknown | RefreshStatus::InProgress => {
                        self.diagnostics.info(&format!(
                            "dataset refresh in progress (status: {})",
                            report.raw_status
                        ));
                    }
                },
                Err(err @ RefreshError::MissingCredentials { .. }) => {
                    self.diagnostics.error(&err.to_string());
                    return RefreshOutcome::Failed(err.to_string());
                }
                Err(err) => {
                    self.diagnostics
                        .warn(&format!("could not retrieve refresh status: {err}"));
                }
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                break;
            }
            std::thread::sleep(self.settings.poll_interval.min(timeout - elapsed));
            if started.elapsed() >= timeout {
                break;
            }
        }

        let reason = format!(
            "dataset refresh did not complete within {}",
            describe_duration(timeout)
        );
        self.diagnostics.error(&reason);
        RefreshOutcome::Failed(reason)
    }

    fn target(&self) -> Result<Target<'_>> {
        let missing = self.settings.missing();
        if !missing.is_empty() {
            return Err(RefreshError::MissingCredentials { missing });
        }
        match (
            self.settings.workspace_id.as_deref(),
            self.settings.dataset_id.as_deref(),
            self.settings.access_token.as_deref(),
        ) {
            (Some(workspace_id), Some(dataset_id), Some(token)) => Ok(Target {
                workspace_id,
                dataset_id,
                token,
            }),
            _ => Err(RefreshError::MissingCredentials { missing }),
        }
    }
}

fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{minutes} minutes")
        }
    } else {
        format!("{secs} seconds")
    }
}
