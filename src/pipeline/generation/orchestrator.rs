use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use super::envelope::GenerationEnvelope;
use super::parser::extract_document;
use super::prompt::{build_user_prompt, resolve_template_slug, system_prompt};
use super::types::ModelClient;
use super::validation::{validate_specification, ValidationResult};
use super::GenerationError;

/// Maximum accepted request length (characters).
pub const MAX_USER_PROMPT_CHARS: usize = 4000;

/// Runs the generation pipeline:
/// compose → invoke model → extract JSON → validate
///
/// Stateless between requests; the model client is shared.
pub struct SiteGenerator {
    model: Arc<dyn ModelClient>,
}

impl SiteGenerator {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Run the pipeline and return the validated specification.
    ///
    /// Blank or oversized input fails with `InvalidInput` before the model
    /// is called. Every other error comes from exactly one stage and is
    /// returned unchanged; nothing is retried.
    pub async fn generate(
        &self,
        user_prompt: &str,
        template_slug: Option<&str>,
    ) -> Result<ValidationResult, GenerationError> {
        let user_prompt = user_prompt.trim();
        if user_prompt.is_empty() {
            return Err(GenerationError::InvalidInput("userPrompt is required".into()));
        }
        if user_prompt.chars().count() > MAX_USER_PROMPT_CHARS {
            return Err(GenerationError::InvalidInput(format!(
                "userPrompt is too long (max {MAX_USER_PROMPT_CHARS} characters)"
            )));
        }

        // Step 1: Compose
        let slug = resolve_template_slug(template_slug);
        let user_instruction = build_user_prompt(user_prompt, slug);

        // Step 2: Invoke
        let started = Instant::now();
        let raw = self.model.generate(system_prompt(), &user_instruction).await?;
        tracing::info!(
            model = self.model.model_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_chars = raw.len(),
            "Model responded"
        );

        // Step 3: Extract
        let doc = extract_document(&raw)?;

        // Step 4: Validate
        validate_specification(doc)
    }

    /// Run the pipeline and wrap the outcome in the uniform envelope.
    ///
    /// The full error is logged here; the envelope only carries its
    /// display message.
    pub async fn run(&self, user_prompt: &str, template_slug: Option<&str>) -> GenerationEnvelope {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("generate_site", %request_id, template = template_slug.unwrap_or_default());

        async move {
            let outcome = self.generate(user_prompt, template_slug).await;
            match &outcome {
                Ok(result) => tracing::info!(
                    pages = result.spec.pages.len(),
                    warnings = result.warnings.len(),
                    "Site specification generated"
                ),
                Err(e) => tracing::error!(
                    stage = e.stage().as_str(),
                    error = %e,
                    "Site specification generation failed"
                ),
            }
            GenerationEnvelope::from(outcome)
        }
        .instrument(span)
        .await
    }
}
