use serde::Serialize;

use super::types::SiteSpecification;
use super::validation::ValidationResult;
use super::{FailureStage, GenerationError};

pub const SUCCESS_MESSAGE: &str = "Site specification generated successfully";
pub const FAILURE_MESSAGE: &str = "Failed to generate site specification";

/// Uniform outcome of one generation request.
///
/// Serializes to `{ success, data, message }` on success and
/// `{ success, error, message }` on failure. `error` is always a short
/// display message; the underlying error is logged, not carried. Validator
/// warnings ride along as `warnings` on success when there are any.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationEnvelope {
    #[serde(rename = "success")]
    pub ok: bool,
    #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
    pub spec: Option<SiteSpecification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: &'static str,
    #[serde(skip)]
    pub stage: Option<FailureStage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl GenerationEnvelope {
    pub fn success(result: ValidationResult) -> Self {
        Self {
            ok: true,
            spec: Some(result.spec),
            error: None,
            message: SUCCESS_MESSAGE,
            stage: None,
            warnings: result.warnings,
        }
    }

    pub fn failure(err: &GenerationError) -> Self {
        Self {
            ok: false,
            spec: None,
            error: Some(err.user_message()),
            message: FAILURE_MESSAGE,
            stage: Some(err.stage()),
            warnings: Vec::new(),
        }
    }
}

impl From<Result<ValidationResult, GenerationError>> for GenerationEnvelope {
    fn from(outcome: Result<ValidationResult, GenerationError>) -> Self {
        match outcome {
            Ok(result) => Self::success(result),
            Err(err) => Self::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generation::types::Brand;
    use serde_json::json;

    fn result() -> ValidationResult {
        ValidationResult {
            spec: SiteSpecification {
                template_slug: "startup".into(),
                brand: Brand::default(),
                pages: vec![],
            },
            warnings: vec!["pages is empty".into()],
        }
    }

    #[test]
    fn success_shape() {
        let envelope = GenerationEnvelope::success(result());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["templateSlug"], "startup");
        assert_eq!(value["message"], SUCCESS_MESSAGE);
        assert!(value.get("error").is_none());
        assert_eq!(value["warnings"], json!(["pages is empty"]));
    }

    #[test]
    fn failure_shape() {
        let envelope = GenerationEnvelope::failure(&GenerationError::Extraction);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": GenerationError::Extraction.user_message(),
                "message": FAILURE_MESSAGE
            })
        );
        assert_eq!(envelope.stage, Some(FailureStage::Extraction));
    }

    #[test]
    fn failure_never_carries_internal_detail() {
        let err = GenerationError::Transport("dns error: api.internal.example".into());
        let value = serde_json::to_value(GenerationEnvelope::failure(&err)).unwrap();
        assert!(!value.to_string().contains("api.internal.example"));
    }

    #[test]
    fn from_result() {
        let ok: GenerationEnvelope = Ok(result()).into();
        assert!(ok.ok);
        let err: GenerationEnvelope = Err(GenerationError::Schema("pages is required".into())).into();
        assert!(!err.ok);
        assert_eq!(err.stage, Some(FailureStage::Schema));
    }
}
