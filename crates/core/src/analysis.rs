//! The structured business analysis produced for one submission.

use serde::{Deserialize, Serialize};

/// The dossier content returned by an analysis provider.
///
/// Attached to a submission record exactly when its status is `completed`;
/// a failed analysis never leaves a partial result behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Two-sentence summary of the prospect's business and core problem.
    pub executive_summary: String,
    /// Read on the prospect's mindset based on their writing.
    pub client_psychology: String,
    /// Critique of the acquisition/sales/fulfillment chain and its broken link.
    pub operational_gap_analysis: String,
    /// Reasons to disqualify the lead.
    pub red_flags: Vec<String>,
    /// Indicators of a high-value client.
    pub green_flags: Vec<String>,
    /// Deep-dive questions to ask on the call.
    pub strategic_questions: Vec<String>,
    /// The angle to pitch based on the desired outcome.
    pub closing_strategy: String,
    /// Fit score, 0-100.
    pub estimated_fit_score: u8,
}
