//! Job status protocol for a submission's analysis lifecycle.
//!
//! A record moves strictly forward through a four-state machine:
//!
//! ```text
//! pending -> processing -> completed
//!                       -> failed
//! ```
//!
//! `completed` and `failed` are terminal. Any other transition request is
//! rejected by the store with `InvalidTransition` and leaves the record
//! untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a submission's analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, analysis not yet started.
    Pending,
    /// The analysis worker owns the record and the external call is in flight.
    Processing,
    /// Analysis succeeded; the record carries the result.
    Completed,
    /// Analysis errored or timed out; no result will ever be attached.
    Failed,
}

impl JobStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// Self-transitions are not permitted; the store treats a repeated
    /// transition request as a conflict, which is what makes duplicate
    /// worker invocations detectable.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// The lowercase wire name for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
