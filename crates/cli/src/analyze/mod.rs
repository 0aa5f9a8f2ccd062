//! Analysis provider abstraction.
//!
//! Defines the `Analyzer` trait that unifies the LLM-backed provider and
//! the offline heuristic provider behind a common async interface. The
//! worker treats whichever provider is configured as an opaque, possibly
//! slow, possibly failing call.

mod heuristic;
mod llm;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use dossier_core::{AnalysisResult, IntakeForm};

pub(crate) use heuristic::HeuristicAnalyzer;
pub(crate) use llm::{LlmAnalyzer, LlmConfig};

/// Error type for analysis operations.
#[derive(Debug)]
pub(crate) enum AnalysisError {
    /// The provider call failed (network, auth, rate limit).
    Api(String),
    /// The provider response could not be parsed into a result.
    Parse(String),
    /// An internal error occurred (task join, misconfiguration).
    Internal(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Api(msg) => write!(f, "API error: {}", msg),
            AnalysisError::Parse(msg) => write!(f, "parse error: {}", msg),
            AnalysisError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Trait for providers that turn an intake form into a business analysis.
///
/// Implementations are invoked exactly once per submission record; retry
/// policy belongs to the operator, not the provider.
#[async_trait]
pub(crate) trait Analyzer: Send + Sync {
    /// Analyze one submission. Slow and fallible; the worker bounds the
    /// call with a timeout and records any failure as a terminal status.
    async fn analyze(&self, submission: &IntakeForm) -> Result<AnalysisResult, AnalysisError>;

    /// Short provider name for operator logs.
    fn name(&self) -> &'static str;
}

/// Pick the analysis provider from the environment.
///
/// With `ANTHROPIC_API_KEY` set, submissions go to the Anthropic Messages
/// API (model overridable via `DOSSIER_MODEL`). Without it, the
/// deterministic heuristic provider runs instead. This is a startup-time
/// configuration choice; a provider failure at analysis time is always
/// recorded as a failed job, never substituted.
pub(crate) fn analyzer_from_env() -> Arc<dyn Analyzer> {
    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.is_empty());

    match api_key {
        Some(key) => {
            let config = match std::env::var("DOSSIER_MODEL").ok().filter(|m| !m.is_empty()) {
                Some(model) => LlmConfig::with_model(key, model),
                None => LlmConfig::new(key),
            };
            Arc::new(LlmAnalyzer::new(config))
        }
        None => Arc::new(HeuristicAnalyzer::new()),
    }
}
