use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Sitegen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address for the HTTP API.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Default timeout for every outbound HTTP call (model, email, webhooks).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "sitegen_lib=info,sitegen=info,tower_http=warn"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings for the generation model.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

/// Settings for the email notification channel.
#[derive(Debug, Clone, Default)]
pub struct EmailSettings {
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl EmailSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.from.is_some() && self.to.is_some()
    }
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub http_timeout: Duration,
    pub model: ModelSettings,
    pub email: EmailSettings,
    pub messaging_webhook_url: Option<String>,
    pub sheets_webhook_url: Option<String>,
    pub cors_origin: Option<String>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent, so an exported-but-empty
    /// variable leaves the corresponding integration unconfigured.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = get("SITEGEN_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "SITEGEN_BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        let http_timeout_secs = parse_number(
            "SITEGEN_HTTP_TIMEOUT_SECS",
            get("SITEGEN_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        let max_tokens = parse_number(
            "SITEGEN_MAX_TOKENS",
            get("SITEGEN_MAX_TOKENS"),
            u64::from(crate::pipeline::generation::DEFAULT_MAX_TOKENS),
        )?;
        let max_tokens = u32::try_from(max_tokens)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "SITEGEN_MAX_TOKENS",
                value: max_tokens.to_string(),
            })?;

        Ok(Self {
            bind_addr,
            http_timeout: Duration::from_secs(http_timeout_secs),
            model: ModelSettings {
                api_key: get("ANTHROPIC_API_KEY"),
                model: get("SITEGEN_MODEL")
                    .unwrap_or_else(|| crate::pipeline::generation::DEFAULT_MODEL.to_string()),
                max_tokens,
            },
            email: EmailSettings {
                api_key: get("RESEND_API_KEY"),
                from: get("CONTACT_EMAIL_FROM"),
                to: get("CONTACT_EMAIL_TO"),
            },
            messaging_webhook_url: get("SLACK_WEBHOOK_URL"),
            sheets_webhook_url: get("SHEETS_WEBHOOK_URL"),
            cors_origin: get("SITEGEN_CORS_ORIGIN"),
        })
    }
}

fn parse_number(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.http_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        assert_eq!(config.model.model, crate::pipeline::generation::DEFAULT_MODEL);
        assert_eq!(
            config.model.max_tokens,
            crate::pipeline::generation::DEFAULT_MAX_TOKENS
        );
        assert!(config.model.api_key.is_none());
        assert!(!config.email.is_configured());
        assert!(config.messaging_webhook_url.is_none());
    }

    #[test]
    fn reads_all_integrations() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SITEGEN_BIND_ADDR", "0.0.0.0:9000"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("SITEGEN_MODEL", "claude-test"),
            ("SITEGEN_MAX_TOKENS", "2048"),
            ("RESEND_API_KEY", "re_test"),
            ("CONTACT_EMAIL_FROM", "site@example.com"),
            ("CONTACT_EMAIL_TO", "sales@example.com"),
            ("SLACK_WEBHOOK_URL", "https://hooks.example.com/x"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.model.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model.model, "claude-test");
        assert_eq!(config.model.max_tokens, 2048);
        assert!(config.email.is_configured());
        assert_eq!(
            config.messaging_webhook_url.as_deref(),
            Some("https://hooks.example.com/x")
        );
    }

    #[test]
    fn blank_values_are_treated_as_absent() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "   "),
            ("SLACK_WEBHOOK_URL", ""),
        ]))
        .unwrap();
        assert!(config.model.api_key.is_none());
        assert!(config.messaging_webhook_url.is_none());
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("SITEGEN_BIND_ADDR", "not-an-addr")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "SITEGEN_BIND_ADDR",
                value: "not-an-addr".into()
            }
        );
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let err =
            AppConfig::from_lookup(lookup_from(&[("SITEGEN_MAX_TOKENS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "SITEGEN_MAX_TOKENS", .. }
        ));
    }

    #[test]
    fn app_name_is_sitegen() {
        assert_eq!(APP_NAME, "Sitegen");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
