use async_trait::async_trait;

use dossier_core::{AnalysisResult, IntakeForm, JobStatus};

use crate::error::StorageError;
use crate::record::SubmissionRecord;

/// The keyed store for submission records and their lifecycle state.
///
/// A `SubmissionStore` maps both `id` (internal) and `token` (public
/// capability) to a `SubmissionRecord`. Every operation completes in
/// bounded local time; nothing here waits on the external analysis call.
///
/// ## Atomic transitions
///
/// `update_status` is a check-and-set against the record's current status:
/// the transition table is evaluated and the write applied under one
/// critical section. Two concurrent workers racing to move the same record
/// out of `pending` see exactly one success; the loser gets
/// `StorageError::InvalidTransition` and the record is untouched.
///
/// ## Thread safety
///
/// Implementations must be `Send + Sync + 'static` to live in axum
/// application state and cross async task boundaries.
#[async_trait]
pub trait SubmissionStore: Send + Sync + 'static {
    /// Persist a new submission: allocates a fresh `id` and `token`, sets
    /// status `pending`, stamps both timestamps, and returns the record.
    async fn create(&self, submission: IntakeForm) -> Result<SubmissionRecord, StorageError>;

    /// Look up a record by its public access token.
    ///
    /// Returns `Err(StorageError::NotFound)` if no record matches.
    async fn get_by_token(&self, token: &str) -> Result<SubmissionRecord, StorageError>;

    /// Look up a record by internal id. Worker-only.
    ///
    /// Returns `Err(StorageError::RecordNotFound)` if no record matches.
    async fn get(&self, id: &str) -> Result<SubmissionRecord, StorageError>;

    /// Atomically transition a record's status, optionally attaching the
    /// analysis, and advance `updated_at`.
    ///
    /// Fails with `Err(StorageError::InvalidTransition)` and leaves the
    /// record untouched when:
    /// - `new_status` is not reachable from the current status, or
    /// - `analysis` is `Some` but `new_status` is not `completed`, or
    /// - `new_status` is `completed` but `analysis` is `None`.
    ///
    /// Returns the updated record on success.
    async fn update_status(
        &self,
        id: &str,
        new_status: JobStatus,
        analysis: Option<AnalysisResult>,
    ) -> Result<SubmissionRecord, StorageError>;
}
