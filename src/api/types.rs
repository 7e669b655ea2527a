//! Shared state for the HTTP API.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::leads::{LeadError, SheetsClient};
use crate::notify::{EmailChannel, MessagingChannel, NotificationDispatcher};
use crate::pipeline::generation::{AnthropicClient, GenerationError, SiteGenerator};

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Services built once at startup and shared by every request.
#[derive(Clone)]
pub struct ApiContext {
    pub generator: Arc<SiteGenerator>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub sheets: Option<Arc<SheetsClient>>,
}

impl ApiContext {
    pub fn new(
        generator: SiteGenerator,
        dispatcher: NotificationDispatcher,
        sheets: Option<SheetsClient>,
    ) -> Self {
        Self {
            generator: Arc::new(generator),
            dispatcher: Arc::new(dispatcher),
            sheets: sheets.map(Arc::new),
        }
    }

    /// Wire the real integrations from configuration.
    ///
    /// Missing credentials do not fail here: the affected integration
    /// reports itself as unconfigured when it is used.
    pub fn from_config(config: &AppConfig) -> Result<Self, ContextError> {
        let model = AnthropicClient::new(&config.model, config.http_timeout)?;
        if !model.is_configured() {
            tracing::warn!("ANTHROPIC_API_KEY not set; generation requests will fail");
        }

        let dispatcher = NotificationDispatcher::new(
            Arc::new(EmailChannel::new(config.email.clone(), config.http_timeout)),
            Arc::new(MessagingChannel::new(
                config.messaging_webhook_url.clone(),
                config.http_timeout,
            )),
        );

        let sheets = config
            .sheets_webhook_url
            .as_deref()
            .map(|url| SheetsClient::new(url, config.http_timeout))
            .transpose()?;

        Ok(Self::new(
            SiteGenerator::new(Arc::new(model)),
            dispatcher,
            sheets,
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Model client: {0}")]
    Model(#[from] GenerationError),
    #[error("Spreadsheet client: {0}")]
    Sheets(#[from] LeadError),
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_unconfigured_environment() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        let ctx = ApiContext::from_config(&config).unwrap();
        assert!(ctx.sheets.is_none());
        assert_eq!(ctx.dispatcher.configured(), (false, false));
        assert_eq!(ctx.generator.model_name(), config.model.model);
    }

    #[test]
    fn sheets_client_built_when_webhook_set() {
        let config = AppConfig::from_lookup(|key| match key {
            "SHEETS_WEBHOOK_URL" => Some("https://script.example.com/exec".into()),
            _ => None,
        })
        .unwrap();
        let ctx = ApiContext::from_config(&config).unwrap();
        assert!(ctx.sheets.is_some());
    }
}
