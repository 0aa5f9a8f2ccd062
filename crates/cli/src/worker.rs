//! Analysis worker: drives one submission record from `pending` to a
//! terminal status around a single invocation of the configured analyzer.
//!
//! The worker runs out-of-band relative to the HTTP request that created
//! the submission (`tokio::spawn` from the intake handler), so the caller
//! is never held open for the external call's latency.

use std::sync::Arc;
use std::time::Duration;

use dossier_core::JobStatus;
use dossier_storage::{StorageError, SubmissionStore};

use crate::analyze::Analyzer;

/// Process one submission: claim it, run the analyzer once, record the
/// outcome.
///
/// Idempotent against duplicate scheduling: if the record has already left
/// `pending`, or another invocation wins the `pending -> processing`
/// check-and-set, this call is a no-op. The analyzer is invoked at most
/// once per record and never retried here; a failed or timed-out call
/// terminates the job as `failed` with the error detail kept to stderr.
pub(crate) async fn process(
    store: Arc<dyn SubmissionStore>,
    analyzer: Arc<dyn Analyzer>,
    id: String,
    timeout: Duration,
) -> Result<(), StorageError> {
    let record = store.get(&id).await?;
    if record.status != JobStatus::Pending {
        // Redelivered job; someone already owns or finished this record.
        return Ok(());
    }

    // Claim the record. Losing the race is not an error.
    match store.update_status(&id, JobStatus::Processing, None).await {
        Ok(_) => {}
        Err(StorageError::InvalidTransition { .. }) => return Ok(()),
        Err(e) => return Err(e),
    }

    match tokio::time::timeout(timeout, analyzer.analyze(&record.submission)).await {
        Ok(Ok(analysis)) => {
            store
                .update_status(&id, JobStatus::Completed, Some(analysis))
                .await?;
        }
        Ok(Err(e)) => {
            // Error detail stays server-side; pollers only see the status.
            eprintln!("analysis failed for submission {}: {}", id, e);
            store.update_status(&id, JobStatus::Failed, None).await?;
        }
        Err(_) => {
            eprintln!(
                "analysis timed out for submission {} after {:?}",
                id, timeout
            );
            store.update_status(&id, JobStatus::Failed, None).await?;
        }
    }

    Ok(())
}
