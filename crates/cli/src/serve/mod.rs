//! `dossier serve` -- HTTP JSON API for intake submission and result polling.
//!
//! Exposes the intake pipeline as an async HTTP service using `axum` +
//! `tokio`. Submissions are persisted immediately and analyzed out-of-band;
//! clients poll by token until they observe a terminal status.
//!
//! Endpoints:
//! - GET  /health                        - Server status
//! - POST /api/submissions               - Submit an intake form
//! - GET  /api/admin/{token}             - Full dossier snapshot
//! - GET  /api/admin/{token}/status      - Lightweight status poll
//!
//! All responses use Content-Type: application/json. CORS is permissive:
//! the wizard frontend is served from a separate origin.

mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use dossier_storage::MemoryStore;

use self::handlers::{
    handle_admin_full, handle_admin_status, handle_health, handle_not_found, handle_submit,
};
use self::state::AppState;
use crate::analyze;

/// Maximum request body size: 1 MB. Intake forms are small.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default upper bound on one external analysis call. The provider is
/// usually done in 10-30 seconds; anything past this is treated as failed.
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 60;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Start the HTTP server on the given port.
///
/// The analysis provider comes from the environment (`ANTHROPIC_API_KEY`
/// selects the LLM provider; otherwise the offline heuristic runs). Admin
/// URLs in submission responses are built from `public_url`, the
/// `DOSSIER_PUBLIC_URL` env var, or `http://localhost:{port}` in that
/// order of preference.
pub async fn start_server(
    port: u16,
    public_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = analyze::analyzer_from_env();
    eprintln!("Analysis provider: {}", analyzer.name());

    let analysis_timeout = std::env::var("DOSSIER_ANALYSIS_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_SECS);
    eprintln!("Analysis timeout: {}s", analysis_timeout);

    let public_url = public_url
        .or_else(|| {
            std::env::var("DOSSIER_PUBLIC_URL")
                .ok()
                .filter(|u| !u.is_empty())
        })
        .unwrap_or_else(|| format!("http://localhost:{}", port));

    let state = Arc::new(AppState {
        store: Arc::new(MemoryStore::new()),
        analyzer,
        public_url,
        analysis_timeout: Duration::from_secs(analysis_timeout),
    });

    // CORS: permissive for the separately-hosted wizard frontend.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/api/submissions", post(handle_submit))
        .route("/api/admin/{token}", get(handle_admin_full))
        .route("/api/admin/{token}/status", get(handle_admin_status))
        .fallback(handle_not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Dossier intake service listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    eprintln!("\nReceived shutdown signal...");
}
