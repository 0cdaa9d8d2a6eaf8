//! Refresh status payloads.

use std::fmt;

use serde::Deserialize;

use crate::error::{RefreshError, Result};

/// State of a refresh job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// Not finished yet (the service reports running jobs as `Unknown`).
    Unknown,
    InProgress,
    Completed,
    Failed,
}

impl RefreshStatus {
    /// Case-insensitive parse; `None` for unrecognised strings.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "inprogress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The most recent refresh of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshStatusReport {
    pub status: RefreshStatus,
    /// Status string exactly as the service sent it.
    pub raw_status: String,
    pub request_id: Option<String>,
    pub refresh_type: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Failure details, present for failed refreshes.
    pub service_exception: Option<String>,
}

impl RefreshStatusReport {
    /// Reason text for a failed refresh.
    pub fn failure_reason(&self) -> String {
        self.service_exception
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshEntry {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    refresh_type: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    service_exception_json: Option<String>,
}

/// Refresh history list, or a single refresh when queried by id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RefreshPayload {
    History { value: Vec<RefreshEntry> },
    Single(RefreshEntry),
}

/// Parsed body plus the unrecognised status string, if any.
pub(crate) struct ParsedStatus {
    pub report: RefreshStatusReport,
    pub unrecognised: Option<String>,
}

/// Parses a status response body. The first history entry is the most
/// recent refresh.
pub(crate) fn parse_status_body(body: &str) -> Result<ParsedStatus> {
    let payload: RefreshPayload = serde_json::from_str(body)
        .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

    let entry = match payload {
        RefreshPayload::History { value } => value
            .into_iter()
            .next()
            .ok_or_else(|| RefreshError::InvalidResponse("refresh history is empty".into()))?,
        RefreshPayload::Single(entry) => entry,
    };

    let raw_status = entry.status.unwrap_or_default();
    let parsed = RefreshStatus::parse(&raw_status);
    let unrecognised = parsed.is_none().then(|| raw_status.clone());

    Ok(ParsedStatus {
        report: RefreshStatusReport {
            status: parsed.unwrap_or(RefreshStatus::Unknown),
            raw_status,
            request_id: entry.request_id,
            refresh_type: entry.refresh_type,
            start_time: entry.start_time,
            end_time: entry.end_time,
            service_exception: entry.service_exception_json,
        },
        unrecognised,
    })
}
