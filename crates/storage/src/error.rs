use dossier_core::JobStatus;

/// All errors that can be returned by a SubmissionStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No record matches the given access token. Surfaced to pollers as 404.
    #[error("no submission matches token {token}")]
    NotFound { token: String },

    /// No record with the given internal id. Only the worker looks up by id,
    /// so this indicates a scheduling bug rather than client error.
    #[error("no submission record with id {id}")]
    RecordNotFound { id: String },

    /// The requested status change is not reachable from the record's
    /// current status, or the analysis payload violates the
    /// present-iff-completed coupling. The record was not mutated.
    #[error("invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },

    /// A backend-specific storage error (connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
