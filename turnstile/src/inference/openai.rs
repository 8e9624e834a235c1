//! OpenAI-compatible chat-completions backend.
//!
//! Speaks the chat-completions wire format used by OpenAI and by
//! compatible endpoints (Azure, Gemini's OpenAI-compatibility layer,
//! local proxies). One request maps to one POST to `/chat/completions`;
//! every failure maps to an [`InferenceError`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};

use crate::error::{ConfigError, InferenceError};

use super::{InferenceRequest, InferenceResponse, InferenceService, ToolCallRequest};

/// Default API base URL.
pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the required API key.
pub const API_KEY_VAR: &str = "TURNSTILE_API_KEY";

/// Environment variable holding an optional custom base URL.
pub const BASE_URL_VAR: &str = "TURNSTILE_BASE_URL";

/// Environment variable holding an optional model override.
pub const MODEL_VAR: &str = "TURNSTILE_MODEL";

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// An [`InferenceService`] backed by an OpenAI-compatible endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use turnstile::inference::OpenAiCompatible;
///
/// // From environment: TURNSTILE_API_KEY (required), TURNSTILE_BASE_URL,
/// // TURNSTILE_MODEL (optional).
/// let service = OpenAiCompatible::from_env()?;
///
/// // Explicit configuration.
/// let service = OpenAiCompatible::builder()
///     .api_key("sk-...")
///     .base_url("https://generativelanguage.googleapis.com/v1beta/openai")
///     .model("gemini-2.0-flash")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct OpenAiCompatible {
    http_client: reqwest::Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
    model: Arc<str>,
}

impl std::fmt::Debug for OpenAiCompatible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatible")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatible {
    /// Create a new client with the given API key and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> OpenAiCompatibleBuilder {
        OpenAiCompatibleBuilder::default()
    }

    /// Create a client from environment variables.
    ///
    /// Reads [`API_KEY_VAR`] (required), [`BASE_URL_VAR`] and [`MODEL_VAR`]
    /// (optional).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the API key variable is absent — the
    /// caller is expected to treat this as fatal at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| ConfigError::missing_var(API_KEY_VAR))?;

        let mut builder = Self::builder().api_key(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_VAR) {
            builder = builder.base_url(base_url);
        }
        if let Ok(model) = std::env::var(MODEL_VAR) {
            builder = builder.model(model);
        }
        builder.build()
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured model id.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn build_body(&self, request: &InferenceRequest) -> Value {
        let mut messages = Vec::new();
        if !request.instructions.is_empty() {
            messages.push(json!({"role": "system", "content": request.instructions}));
        }
        messages.push(json!({"role": "user", "content": request.input}));
        messages.extend(request.continuation.iter().cloned());

        let mut body = json!({
            "model": &*self.model,
            "messages": messages,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(max) = request.max_tokens {
            body["max_tokens"] = json!(max);
        }
        if let Some(ref tools) = request.tools {
            body["tools"] = json!(tools);
            if let Some(ref choice) = request.tool_choice {
                body["tool_choice"] = json!(choice);
            }
        }
        if let Some(ref schema) = request.response_schema {
            let name = request.schema_name.as_deref().unwrap_or("response");
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": name,
                    "schema": schema,
                    "strict": true,
                },
            });
        }

        body
    }

    fn parse_message(
        message: &Value,
        wants_value: bool,
    ) -> Result<InferenceResponse, InferenceError> {
        let tool_calls = message
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|call| {
                        let id = call.get("id")?.as_str()?.to_string();
                        let function = call.get("function")?;
                        let name = function.get("name")?.as_str()?.to_string();
                        let arguments = function
                            .get("arguments")
                            .and_then(Value::as_str)
                            .unwrap_or("{}")
                            .to_string();
                        Some(ToolCallRequest {
                            id,
                            name,
                            arguments,
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let text = message
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string);

        let value = if wants_value {
            let content = text.as_deref().ok_or_else(|| {
                InferenceError::response_format("schema-constrained JSON content", "empty content")
            })?;
            Some(serde_json::from_str::<Value>(content).map_err(|e| {
                InferenceError::response_format("schema-constrained JSON content", e.to_string())
            })?)
        } else {
            None
        };

        Ok(InferenceResponse {
            text,
            value,
            tool_calls,
            raw_message: Some(message.clone()),
        })
    }
}

#[async_trait]
impl InferenceService for OpenAiCompatible {
    async fn complete(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = self.build_body(request);

        tracing::debug!(model = %self.model, url = %url, "inference request");

        let response = self
            .http_client
            .post(&url)
            .headers(self.auth_headers())
            .json(&body)
            .send()
            .await
            .map_err(InferenceError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => InferenceError::auth(body),
                429 => InferenceError::rate_limited(),
                code => InferenceError::http_status(code, body),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| InferenceError::response_format("JSON body", e.to_string()))?;

        let message = payload
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| {
                InferenceError::response_format("choices[0].message", payload.to_string())
            })?;

        Self::parse_message(message, request.has_schema())
    }
}

/// Builder for [`OpenAiCompatible`].
#[derive(Debug, Default)]
pub struct OpenAiCompatibleBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

impl OpenAiCompatibleBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the model id sent with every request.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the request timeout in seconds. Defaults to 60.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the API key is not set or the HTTP
    /// client fails to build.
    pub fn build(self) -> Result<OpenAiCompatible, ConfigError> {
        let api_key = self
            .api_key
            .ok_or_else(|| ConfigError::invalid("api_key", "not set"))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| OPENAI_API_BASE_URL.to_string());
        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout = std::time::Duration::from_secs(self.timeout_secs.unwrap_or(60));

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::invalid("http_client", e.to_string()))?;

        Ok(OpenAiCompatible {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = OpenAiCompatible::new("test-key").unwrap();
        assert_eq!(client.base_url(), OPENAI_API_BASE_URL);
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_builder_custom() {
        let client = OpenAiCompatible::builder()
            .api_key("test-key")
            .base_url("https://custom.api.com/v1")
            .model("gemini-2.0-flash")
            .timeout_secs(30)
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "https://custom.api.com/v1");
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_builder_requires_api_key() {
        assert!(OpenAiCompatible::builder().build().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = OpenAiCompatible::new("super-secret").unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_body_includes_schema() {
        let client = OpenAiCompatible::new("k").unwrap();
        let request = InferenceRequest::new("inst", "text")
            .with_schema("verdict", serde_json::json!({"type": "object"}))
            .with_temperature(0.2);
        let body = client.build_body(&request);

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "verdict");
        assert_eq!(body["temperature"], 0.2);
    }

    #[test]
    fn test_parse_message_structured() {
        let message = serde_json::json!({
            "role": "assistant",
            "content": "{\"off_topic\": true}",
        });
        let resp = OpenAiCompatible::parse_message(&message, true).unwrap();
        assert_eq!(resp.value.unwrap()["off_topic"], true);
    }

    #[test]
    fn test_parse_message_malformed_json_is_error() {
        let message = serde_json::json!({
            "role": "assistant",
            "content": "definitely not json",
        });
        let err = OpenAiCompatible::parse_message(&message, true).unwrap_err();
        assert_eq!(err.kind, crate::error::InferenceErrorKind::ResponseFormat);
    }

    #[test]
    fn test_parse_message_tool_calls() {
        let message = serde_json::json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "check_balance", "arguments": "{}"},
            }],
        });
        let resp = OpenAiCompatible::parse_message(&message, false).unwrap();
        assert!(resp.has_tool_calls());
        assert_eq!(resp.tool_calls[0].name, "check_balance");
    }
}
