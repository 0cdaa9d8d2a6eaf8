//! Dataset refresh notifications.
//!
//! After a successful run the cleaned file is picked up by a hosted
//! dataset. This crate asks the Power BI REST API to refresh that dataset
//! and can poll until the refresh job finishes.
//!
//! All operations are best effort: failures are reported through the
//! [`Diagnostics`](sheetsync_model::Diagnostics) sink and returned as a
//! [`RefreshOutcome`] or [`RefreshError`], never as a panic.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sheetsync_model::TracingDiagnostics;
//! use sheetsync_refresh::{RefreshNotifier, RefreshSettings};
//!
//! let settings = RefreshSettings::from_lookup(|key| std::env::var(key).ok(), None, None);
//! let notifier = RefreshNotifier::new(settings, Arc::new(TracingDiagnostics::new("refresh")))?;
//! let outcome = notifier.trigger_refresh();
//! ```

mod error;
mod notifier;
mod settings;
mod status;

pub use error::{RefreshError, Result};
pub use notifier::{RefreshNotifier, RefreshOutcome};
pub use settings::{
    ACCESS_TOKEN_ENV, DATASET_ID_ENV, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL,
    DEFAULT_REQUEST_TIMEOUT, RefreshSettings, WORKSPACE_ID_ENV,
};
pub use status::{RefreshStatus, RefreshStatusReport};
