mod analysis;
mod intake;
mod status;

pub use analysis::AnalysisResult;
pub use intake::{IntakeForm, ValidationError};
pub use status::JobStatus;
