//! The intake questionnaire payload and its mandatory-field validation.
//!
//! Field names on the wire are camelCase to match the wizard frontend.
//! The core never interprets field content; everything is an opaque string
//! except `commitmentLevel`. String fields default to empty on
//! deserialization so that validation, not serde, decides what a partial
//! body means.

use serde::{Deserialize, Serialize};

/// The collected answers from the intake wizard.
///
/// Immutable once a submission record is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeForm {
    // Basics
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub website: String,
    pub company_name: String,

    // Current reality
    pub current_revenue: String,
    pub team_size: String,
    pub primary_service: String,
    pub average_deal_size: String,
    pub biggest_bottleneck: String,

    // Process and operations
    pub acquisition_source: String,
    pub sales_process: String,
    pub fulfillment_workflow: String,
    pub current_tech_stack: String,

    // Desired future
    pub revenue_goal: String,
    pub dream_outcome: String,
    pub magic_wand_scenario: String,
    /// Self-reported commitment, 1-10.
    pub commitment_level: u8,
}

/// A submission was rejected because mandatory fields were missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    /// Wire names of the empty mandatory fields.
    pub missing: Vec<&'static str>,
}

impl IntakeForm {
    /// Check the mandatory identity and contact subset for non-emptiness.
    ///
    /// Only non-emptiness is validated here; business-rule content (email
    /// shape, revenue brackets) belongs to the wizard, not the core.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.first_name.trim().is_empty() {
            missing.push("firstName");
        }
        if self.last_name.trim().is_empty() {
            missing.push("lastName");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}
