//! LLM-backed analysis provider: uses the Anthropic Messages API to turn
//! an intake form into a structured sales dossier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dossier_core::{AnalysisResult, IntakeForm};

use super::{AnalysisError, Analyzer};

/// Anthropic Messages API endpoint.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Required API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model for intake analysis.
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration for the LLM analysis provider.
#[derive(Debug, Clone)]
pub(crate) struct LlmConfig {
    /// Anthropic API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

impl LlmConfig {
    /// Create a new config with the given API key and the default model.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a new config with the given API key and model.
    pub fn with_model(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }
}

/// An analysis provider that calls the Anthropic Messages API.
pub(crate) struct LlmAnalyzer {
    config: LlmConfig,
}

impl LlmAnalyzer {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(&self, submission: &IntakeForm) -> Result<AnalysisResult, AnalysisError> {
        let system_prompt = build_system_prompt();
        let user_prompt = build_user_prompt(submission);

        // ureq is synchronous, so wrap in spawn_blocking
        let api_key = self.config.api_key.clone();
        let model = self.config.model.clone();

        let response_text = tokio::task::spawn_blocking(move || {
            call_anthropic_api(&api_key, &model, &system_prompt, &user_prompt)
        })
        .await
        .map_err(|e| AnalysisError::Internal(format!("task join error: {}", e)))??;

        parse_analysis_response(&response_text)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// ── Prompt construction ──────────────────────────────────────────────────────

/// Build the system prompt instructing the model to return dossier JSON.
fn build_system_prompt() -> String {
    r#"You are a world-class business consultant and sales strategist preparing
an analyst for a discovery call. Be direct, critical, and strategic. Do not
fluff the response.

Return ONLY a JSON object. No explanation, no markdown, no code fences. The
object must have exactly these keys:
{
  "executiveSummary": "<2-sentence summary of the prospect's business and core problem>",
  "clientPsychology": "<the prospect's mindset based on their writing style, e.g. frustrated, ambitious, skeptical>",
  "operationalGapAnalysis": "<critical look at their acquisition, sales, and fulfillment processes; name the specific broken link in the chain>",
  "redFlags": ["<risk or reason to disqualify this lead>", ...],
  "greenFlags": ["<indicator they are a high-value client>", ...],
  "strategicQuestions": ["<3-5 deep-dive questions to expose pain or build authority>", ...],
  "closingStrategy": "<specific angle to pitch based on their desired outcome>",
  "estimatedFitScore": <integer 0-100>
}

Identify the gap between their current reality and desired future. Look for
inconsistencies in their process descriptions. Determine whether they are a
tire kicker or a serious buyer."#
        .to_string()
}

/// Build the user prompt containing the intake answers.
fn build_user_prompt(form: &IntakeForm) -> String {
    format!(
        r#"Analyze the following intake form data from a new prospect booking a discovery call.

PROSPECT:
Name: {first} {last}
Company: {company} ({website})
Contact: {email}

CURRENT FINANCIALS:
Current Revenue: {revenue}
Average Deal Size: {deal_size}
Team Size: {team_size}
Primary Service: {service}
Biggest Bottleneck: {bottleneck}

PROCESS & OPERATIONS:
Client Acquisition (how they get leads): {acquisition}
Sales Process (how they close): {sales}
Fulfillment/Delivery (how they do the work): {fulfillment}
Tech Stack: {tech}

FUTURE GOALS:
Revenue Goal: {goal}
Dream Outcome: {dream}
Magic Wand Scenario: {magic_wand}
Commitment Level (1-10): {commitment}"#,
        first = form.first_name,
        last = form.last_name,
        company = form.company_name,
        website = form.website,
        email = form.email,
        revenue = form.current_revenue,
        deal_size = form.average_deal_size,
        team_size = form.team_size,
        service = form.primary_service,
        bottleneck = form.biggest_bottleneck,
        acquisition = form.acquisition_source,
        sales = form.sales_process,
        fulfillment = form.fulfillment_workflow,
        tech = form.current_tech_stack,
        goal = form.revenue_goal,
        dream = form.dream_outcome,
        magic_wand = form.magic_wand_scenario,
        commitment = form.commitment_level,
    )
}

// ── API call ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[allow(dead_code)] // Required by serde for correct JSON deserialization
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

/// Make a synchronous call to the Anthropic Messages API.
fn call_anthropic_api(
    api_key: &str,
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String, AnalysisError> {
    let request_body = MessagesRequest {
        model: model.to_string(),
        max_tokens: 4096,
        system: system_prompt.to_string(),
        messages: vec![ApiMessage {
            role: "user".to_string(),
            content: user_prompt.to_string(),
        }],
    };

    let agent = ureq::Agent::new_with_defaults();
    let response = agent
        .post(ANTHROPIC_API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("content-type", "application/json")
        .send_json(&request_body)
        .map_err(|e| AnalysisError::Api(format!("API request failed: {}", e)))?;

    let resp: MessagesResponse = response
        .into_body()
        .read_json()
        .map_err(|e| AnalysisError::Parse(format!("failed to parse API response: {}", e)))?;

    resp.content
        .first()
        .and_then(|block| block.text.clone())
        .ok_or_else(|| AnalysisError::Parse("API response contained no text content".to_string()))
}

// ── Response parsing ─────────────────────────────────────────────────────────

/// The dossier object as the model returns it. Kept separate from
/// `AnalysisResult` so an out-of-range score can be clamped instead of
/// failing the whole analysis.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    executive_summary: String,
    client_psychology: String,
    operational_gap_analysis: String,
    red_flags: Vec<String>,
    green_flags: Vec<String>,
    strategic_questions: Vec<String>,
    closing_strategy: String,
    estimated_fit_score: i64,
}

/// Parse the model's response text into an `AnalysisResult`.
fn parse_analysis_response(response_text: &str) -> Result<AnalysisResult, AnalysisError> {
    let trimmed = response_text.trim();

    // Strip markdown code fences if present
    let json_str = strip_code_fences(trimmed);

    let raw: RawAnalysis = serde_json::from_str(json_str).map_err(|e| {
        AnalysisError::Parse(format!(
            "failed to parse analysis as JSON object: {}. Response was: {}",
            e,
            truncate(trimmed, 200)
        ))
    })?;

    Ok(AnalysisResult {
        executive_summary: raw.executive_summary,
        client_psychology: raw.client_psychology,
        operational_gap_analysis: raw.operational_gap_analysis,
        red_flags: raw.red_flags,
        green_flags: raw.green_flags,
        strategic_questions: raw.strategic_questions,
        closing_strategy: raw.closing_strategy,
        estimated_fit_score: raw.estimated_fit_score.clamp(0, 100) as u8,
    })
}

/// Strip markdown code fences (```json ... ```) from the response.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with("```") {
        // Find the end of the first line (skip ```json or ```)
        let after_open = if let Some(nl) = text.find('\n') {
            &text[nl + 1..]
        } else {
            return text;
        };
        // Strip trailing ```
        if let Some(close) = after_open.rfind("```") {
            return after_open[..close].trim();
        }
        return after_open.trim();
    }
    text
}

/// Truncate a string for error messages. `max` is a byte budget; the cut
/// backs off to a char boundary so multibyte text never splits mid-character.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
