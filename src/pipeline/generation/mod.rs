pub mod schema;
pub mod types;
pub mod prompt;
pub mod anthropic;
pub mod parser;
pub mod validation;
pub mod envelope;
pub mod orchestrator;

pub use schema::*;
pub use types::*;
pub use prompt::*;
pub use anthropic::*;
pub use parser::*;
pub use validation::*;
pub use envelope::*;
pub use orchestrator::*;

use thiserror::Error;

/// Model identity used for every generation request unless configured otherwise.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Output budget per generation call. Bounds response size and cost.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Generation model is not configured (missing API key)")]
    NotConfigured,

    #[error("Transport error calling generation model: {0}")]
    Transport(String),

    #[error("Generation model returned error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Unexpected response from generation model: {0}")]
    UnexpectedContent(String),

    #[error("No JSON object found in model output")]
    Extraction,

    #[error("JSON parsing error: {0}")]
    Parse(String),

    #[error("Schema error: {0}")]
    Schema(String),
}

/// Coarse class of a generation failure, used for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Input,
    Model,
    Extraction,
    Schema,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Input => "input",
            FailureStage::Model => "model",
            FailureStage::Extraction => "extraction",
            FailureStage::Schema => "schema",
        }
    }
}

impl GenerationError {
    pub fn stage(&self) -> FailureStage {
        match self {
            GenerationError::InvalidInput(_) => FailureStage::Input,
            GenerationError::NotConfigured
            | GenerationError::Transport(_)
            | GenerationError::Upstream { .. }
            | GenerationError::UnexpectedContent(_) => FailureStage::Model,
            GenerationError::Extraction | GenerationError::Parse(_) => FailureStage::Extraction,
            GenerationError::Schema(_) => FailureStage::Schema,
        }
    }

    /// Short message safe to show to an end user.
    ///
    /// Never includes upstream bodies, transport details or parser positions;
    /// those stay in the `Display` output, which is only logged.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::InvalidInput(reason) => reason.clone(),
            GenerationError::NotConfigured => {
                "The site generator is not available right now".to_string()
            }
            GenerationError::Transport(_) | GenerationError::Upstream { .. } => {
                "The generation service could not be reached".to_string()
            }
            GenerationError::UnexpectedContent(_) => {
                "The generation service returned an unexpected response".to_string()
            }
            GenerationError::Extraction => {
                "The generated answer did not contain a site specification".to_string()
            }
            GenerationError::Parse(_) => {
                "The generated site specification was malformed".to_string()
            }
            GenerationError::Schema(reason) => {
                format!("The generated site specification is incomplete: {reason}")
            }
        }
    }
}
