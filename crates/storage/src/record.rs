use serde::{Deserialize, Serialize};

use dossier_core::{AnalysisResult, IntakeForm, JobStatus};

/// The unit of lifecycle state: one intake submission and its analysis job.
///
/// Created once by the intake API, mutated only through the store's
/// status transition, and read-only to pollers. `analysis` is `Some` if
/// and only if `status` is `completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Internal identifier. Never reused, never exposed as a capability.
    pub id: String,
    /// Unguessable access token. Possession grants read access to this
    /// record's status and result; distinct from `id`.
    pub token: String,
    /// The intake answers. Write-once.
    pub submission: IntakeForm,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// The analysis result, present exactly when `status` is `completed`.
    pub analysis: Option<AnalysisResult>,
    /// ISO 8601 / RFC 3339 timestamp string. Set at creation, immutable.
    pub created_at: String,
    /// ISO 8601 / RFC 3339 timestamp string. Advanced on every transition.
    pub updated_at: String,
}
