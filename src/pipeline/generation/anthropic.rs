use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::ModelClient;
use super::GenerationError;
use crate::config::ModelSettings;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API client for the generation model.
pub struct AnthropicClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(settings: &ModelSettings, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            timeout,
            client,
        })
    }

    /// Point the client at a different API host (proxies, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Request body for POST /v1/messages
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from POST /v1/messages
#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: [Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Transport(format!(
                        "Request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    GenerationError::Transport(format!("Cannot connect to {}", self.base_url))
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::UnexpectedContent(e.to_string()))?;

        match parsed.content.into_iter().next() {
            Some(ContentBlock::Text { text }) => Ok(text),
            Some(ContentBlock::Other) => Err(GenerationError::UnexpectedContent(
                "First content block is not text".into(),
            )),
            None => Err(GenerationError::UnexpectedContent(
                "Response has no content blocks".into(),
            )),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Mock model client for testing: returns a configured reply and records calls.
pub struct MockModelClient {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last_prompts: Mutex<Option<(String, String)>>,
}

impl MockModelClient {
    pub fn new(response: &str) -> Self {
        Self {
            reply: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
            last_prompts: Mutex::new(None),
        }
    }

    /// A client whose every call fails with a transport error.
    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
            last_prompts: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The `(system, user)` pair of the most recent call.
    pub fn last_prompts(&self) -> Option<(String, String)> {
        self.last_prompts.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_prompts.lock() {
            *guard = Some((system.to_string(), user.to_string()));
        }
        self.reply.clone().map_err(GenerationError::Transport)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn settings(api_key: Option<&str>) -> ModelSettings {
        ModelSettings {
            api_key: api_key.map(String::from),
            model: "claude-test".into(),
            max_tokens: 1024,
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn stub(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/v1/messages",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        serve(app).await
    }

    fn client(base_url: &str) -> AnthropicClient {
        AnthropicClient::new(&settings(Some("sk-test")), Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn returns_text_of_first_content_block() {
        let url = stub(
            StatusCode::OK,
            json!({"content": [{"type": "text", "text": "{\"templateSlug\":\"startup\"}"}]}),
        )
        .await;
        let text = client(&url).generate("sys", "user").await.unwrap();
        assert_eq!(text, "{\"templateSlug\":\"startup\"}");
    }

    #[tokio::test]
    async fn sends_model_budget_and_credentials() {
        let app = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(req): Json<Value>| async move {
                let echo = format!(
                    "{}|{}|{}|{}|{}",
                    headers["x-api-key"].to_str().unwrap(),
                    headers["anthropic-version"].to_str().unwrap(),
                    req["model"].as_str().unwrap(),
                    req["max_tokens"],
                    req["messages"][0]["content"].as_str().unwrap(),
                );
                Json(json!({"content": [{"type": "text", "text": echo}]}))
            }),
        );
        let url = serve(app).await;
        let text = client(&url).generate("sys", "hello").await.unwrap();
        assert_eq!(text, "sk-test|2023-06-01|claude-test|1024|hello");
    }

    #[tokio::test]
    async fn non_text_block_is_unexpected_content() {
        let url = stub(
            StatusCode::OK,
            json!({"content": [{"type": "tool_use", "id": "t1", "name": "x", "input": {}}]}),
        )
        .await;
        let err = client(&url).generate("sys", "user").await.unwrap_err();
        assert!(matches!(err, GenerationError::UnexpectedContent(_)));
    }

    #[tokio::test]
    async fn empty_content_is_unexpected_content() {
        let url = stub(StatusCode::OK, json!({"content": []})).await;
        let err = client(&url).generate("sys", "user").await.unwrap_err();
        assert!(matches!(err, GenerationError::UnexpectedContent(_)));
    }

    #[tokio::test]
    async fn error_status_is_upstream_error() {
        let url = stub(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"type": "error", "error": {"type": "overloaded_error"}}),
        )
        .await;
        let err = client(&url).generate("sys", "user").await.unwrap_err();
        match err {
            GenerationError::Upstream { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("overloaded_error"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let err = client("http://127.0.0.1:1")
            .generate("sys", "user")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let client = AnthropicClient::new(&settings(None), Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        assert!(!client.is_configured());
        let err = client.generate("sys", "user").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured));
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = client("http://localhost:9999/");
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.model_name(), "claude-test");
        assert_eq!(client.max_tokens(), 1024);
    }

    #[tokio::test]
    async fn mock_client_records_calls() {
        let mock = MockModelClient::new("reply");
        assert_eq!(mock.generate("s", "u").await.unwrap(), "reply");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_prompts(), Some(("s".into(), "u".into())));
    }

    #[tokio::test]
    async fn failing_mock_returns_transport_error() {
        let mock = MockModelClient::failing("down");
        let err = mock.generate("s", "u").await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(ref r) if r == "down"));
    }
}
