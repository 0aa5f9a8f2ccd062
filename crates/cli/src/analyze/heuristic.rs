//! Heuristic analysis provider: a deterministic, offline scorer used when
//! no API key is configured. Produces a fully populated dossier from rule
//! checks over the intake answers, so the submission/polling pipeline works
//! end to end without network access.

use async_trait::async_trait;

use dossier_core::{AnalysisResult, IntakeForm};

use super::{AnalysisError, Analyzer};

/// A bottleneck description longer than this reads as articulated pain
/// rather than a one-word placeholder.
const DETAILED_ANSWER_LEN: usize = 40;

/// An analysis provider using fixed scoring rules over the intake answers.
pub(crate) struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Analyzer for HeuristicAnalyzer {
    async fn analyze(&self, submission: &IntakeForm) -> Result<AnalysisResult, AnalysisError> {
        Ok(score_submission(submission))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

fn has_answer(field: &str) -> bool {
    !field.trim().is_empty()
}

/// Build a dossier from rule checks. Deterministic for a given form.
fn score_submission(form: &IntakeForm) -> AnalysisResult {
    let mut score: i64 = 40;
    let mut red_flags = Vec::new();
    let mut green_flags = Vec::new();

    if form.commitment_level >= 8 {
        score += 15;
        green_flags.push(format!(
            "self-reported commitment of {}/10",
            form.commitment_level
        ));
    } else if form.commitment_level >= 5 {
        score += 8;
    } else {
        red_flags.push(format!(
            "low self-reported commitment ({}/10)",
            form.commitment_level
        ));
    }

    if has_answer(&form.current_revenue) {
        score += 10;
    } else {
        red_flags.push("did not disclose current revenue".to_string());
    }

    for (field, label) in [
        (&form.acquisition_source, "client acquisition"),
        (&form.sales_process, "sales process"),
        (&form.fulfillment_workflow, "fulfillment workflow"),
    ] {
        if has_answer(field) {
            score += 5;
        } else {
            red_flags.push(format!("no {} described", label));
        }
    }

    if form.biggest_bottleneck.trim().len() > DETAILED_ANSWER_LEN {
        score += 10;
        green_flags.push("articulates the bottleneck in concrete detail".to_string());
    }

    if has_answer(&form.revenue_goal) && has_answer(&form.dream_outcome) {
        score += 5;
        green_flags.push("has a stated revenue goal and desired outcome".to_string());
    }

    let score = score.clamp(0, 100) as u8;

    let company = if has_answer(&form.company_name) {
        form.company_name.trim()
    } else {
        "The prospect"
    };

    let executive_summary = format!(
        "{} offers {} at {} in revenue. Their stated bottleneck: {}.",
        company,
        or_unspecified(&form.primary_service),
        or_unspecified(&form.current_revenue),
        or_unspecified(&form.biggest_bottleneck),
    );

    let client_psychology = if form.commitment_level >= 8 {
        "High stated commitment; answers suggest an ambitious buyer ready to move.".to_string()
    } else if form.commitment_level >= 5 {
        "Moderate commitment; likely evaluating several options.".to_string()
    } else {
        "Low stated commitment; treat as exploratory until proven otherwise.".to_string()
    };

    let weakest_link = if !has_answer(&form.acquisition_source) {
        "acquisition: no repeatable lead channel is described"
    } else if !has_answer(&form.sales_process) {
        "sales: no defined closing process is described"
    } else if !has_answer(&form.fulfillment_workflow) {
        "fulfillment: delivery is undocumented"
    } else {
        "no single broken link stands out; pressure-test each stage on the call"
    };
    let operational_gap_analysis = format!(
        "Acquisition via {}; closing via {}; delivery via {}. Weakest link: {}.",
        or_unspecified(&form.acquisition_source),
        or_unspecified(&form.sales_process),
        or_unspecified(&form.fulfillment_workflow),
        weakest_link,
    );

    let strategic_questions = vec![
        format!(
            "What have you already tried to fix \"{}\", and why didn't it stick?",
            or_unspecified(&form.biggest_bottleneck)
        ),
        format!(
            "What changes for you personally once you reach {}?",
            or_unspecified(&form.revenue_goal)
        ),
        "If nothing changes in the next 12 months, what does that cost you?".to_string(),
        "Who else is involved in this decision?".to_string(),
    ];

    let closing_strategy = format!(
        "Bridge from \"{}\" to \"{}\": quantify the gap, then anchor the pitch on the weakest operational link.",
        or_unspecified(&form.biggest_bottleneck),
        or_unspecified(&form.dream_outcome),
    );

    AnalysisResult {
        executive_summary,
        client_psychology,
        operational_gap_analysis,
        red_flags,
        green_flags,
        strategic_questions,
        closing_strategy,
        estimated_fit_score: score,
    }
}

fn or_unspecified(field: &str) -> &str {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        "(not provided)"
    } else {
        trimmed
    }
}
