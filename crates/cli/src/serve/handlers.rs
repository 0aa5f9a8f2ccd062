//! HTTP route handlers: health, intake submission, and admin polling.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use dossier_core::IntakeForm;
use dossier_storage::StorageError;

use crate::worker;

use super::json_error;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// POST /api/submissions
///
/// Persists the intake form as a pending record and schedules the analysis
/// worker out-of-band; the response never waits on the external call. The
/// returned token (and the admin URL built from it) is the caller's only
/// handle for polling.
pub(crate) async fn handle_submit(
    State(state): State<Arc<AppState>>,
    Json(form): Json<IntakeForm>,
) -> impl IntoResponse {
    if let Err(e) = form.validate() {
        return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response();
    }

    let record = match state.store.create(form).await {
        Ok(record) => record,
        Err(e) => {
            eprintln!("failed to persist submission: {}", e);
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to persist submission",
            )
            .into_response();
        }
    };

    let store = state.store.clone();
    let analyzer = state.analyzer.clone();
    let id = record.id.clone();
    let timeout = state.analysis_timeout;
    tokio::spawn(async move {
        if let Err(e) = worker::process(store, analyzer, id, timeout).await {
            eprintln!("analysis worker error: {}", e);
        }
    });

    let admin_url = format!(
        "{}/api/admin/{}",
        state.public_url.trim_end_matches('/'),
        record.token
    );
    let response = serde_json::json!({
        "id": record.id,
        "token": record.token,
        "adminUrl": admin_url,
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/admin/{token}
///
/// Full snapshot for the admin dossier view. `analysis` is JSON null
/// unless the job completed. Never blocks waiting for a terminal state.
pub(crate) async fn handle_admin_full(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    match state.store.get_by_token(&token).await {
        Ok(record) => {
            let response = serde_json::json!({
                "submission": record.submission,
                "analysis": record.analysis,
                "status": record.status,
                "createdAt": record.created_at,
            });
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(StorageError::NotFound { .. }) => {
            json_error(StatusCode::NOT_FOUND, "not found").into_response()
        }
        Err(e) => {
            eprintln!("admin lookup failed: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "lookup failed").into_response()
        }
    }
}

/// GET /api/admin/{token}/status
///
/// Lightweight poll: the status plus the fit score once completed,
/// omitting the full payload.
pub(crate) async fn handle_admin_status(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    match state.store.get_by_token(&token).await {
        Ok(record) => {
            let mut response = serde_json::json!({ "status": record.status });
            if let Some(analysis) = &record.analysis {
                response["estimatedFitScore"] =
                    serde_json::json!(analysis.estimated_fit_score);
            }
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(StorageError::NotFound { .. }) => {
            json_error(StatusCode::NOT_FOUND, "not found").into_response()
        }
        Err(e) => {
            eprintln!("status lookup failed: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "lookup failed").into_response()
        }
    }
}
