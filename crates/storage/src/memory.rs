//! In-memory submission store.
//!
//! The reference backend: a single mutex over the record map and the token
//! index, which makes `update_status` a true check-and-set. Suitable for a
//! single-process deployment; durable backends implement the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use tokio::sync::Mutex;

use dossier_core::{AnalysisResult, IntakeForm, JobStatus};

use crate::error::StorageError;
use crate::record::SubmissionRecord;
use crate::traits::SubmissionStore;

/// Byte length of the internal id before encoding.
const ID_BYTES: usize = 9;

/// Byte length of the access token before encoding. 32 random bytes keep
/// the token unguessable; it is the only thing guarding the admin view.
const TOKEN_BYTES: usize = 32;

#[derive(Default)]
struct Inner {
    /// Records keyed by internal id.
    records: HashMap<String, SubmissionRecord>,
    /// Token -> id index for public lookups.
    by_token: HashMap<String, String>,
}

/// An in-memory `SubmissionStore` backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held. Test support; not on the trait.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }
}

/// Generate a URL-safe random identifier of `n_bytes` entropy.
fn random_id(n_bytes: usize) -> String {
    let mut bytes = vec![0u8; n_bytes];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Current UTC time as an RFC 3339 string.
fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn create(&self, submission: IntakeForm) -> Result<SubmissionRecord, StorageError> {
        let mut inner = self.inner.lock().await;

        // Collisions are astronomically unlikely; regenerating under the
        // lock keeps uniqueness unconditional anyway.
        let mut id = random_id(ID_BYTES);
        while inner.records.contains_key(&id) {
            id = random_id(ID_BYTES);
        }
        let mut token = random_id(TOKEN_BYTES);
        while inner.by_token.contains_key(&token) {
            token = random_id(TOKEN_BYTES);
        }

        let now = now_rfc3339();
        let record = SubmissionRecord {
            id: id.clone(),
            token: token.clone(),
            submission,
            status: JobStatus::Pending,
            analysis: None,
            created_at: now.clone(),
            updated_at: now,
        };

        inner.by_token.insert(token, id.clone());
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    async fn get_by_token(&self, token: &str) -> Result<SubmissionRecord, StorageError> {
        let inner = self.inner.lock().await;
        let id = inner
            .by_token
            .get(token)
            .ok_or_else(|| StorageError::NotFound {
                token: token.to_string(),
            })?;
        inner
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                token: token.to_string(),
            })
    }

    async fn get(&self, id: &str) -> Result<SubmissionRecord, StorageError> {
        let inner = self.inner.lock().await;
        inner
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::RecordNotFound { id: id.to_string() })
    }

    async fn update_status(
        &self,
        id: &str,
        new_status: JobStatus,
        analysis: Option<AnalysisResult>,
    ) -> Result<SubmissionRecord, StorageError> {
        let mut inner = self.inner.lock().await;
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| StorageError::RecordNotFound { id: id.to_string() })?;

        let analysis_coupling_ok = match new_status {
            JobStatus::Completed => analysis.is_some(),
            _ => analysis.is_none(),
        };
        if !record.status.can_transition_to(new_status) || !analysis_coupling_ok {
            // Check-and-set failed: report the conflict without touching
            // the record.
            return Err(StorageError::InvalidTransition {
                id: id.to_string(),
                from: record.status,
                to: new_status,
            });
        }

        record.status = new_status;
        record.analysis = analysis;
        record.updated_at = now_rfc3339();
        Ok(record.clone())
    }
}
