//! Application state shared across request handlers.

use std::sync::Arc;
use std::time::Duration;

use dossier_storage::SubmissionStore;

use crate::analyze::Analyzer;

/// Shared server state: the record store, the configured analysis
/// provider, and the knobs the handlers need.
pub(crate) struct AppState {
    /// Submission records keyed by id and token.
    pub(crate) store: Arc<dyn SubmissionStore>,
    /// The analysis provider invoked by the worker.
    pub(crate) analyzer: Arc<dyn Analyzer>,
    /// Base URL used to build admin links returned to submitters.
    pub(crate) public_url: String,
    /// Upper bound on one external analysis call.
    pub(crate) analysis_timeout: Duration,
}
