//! Model inference service boundary.
//!
//! This module defines the single seam between the pipeline and a hosted
//! large-language-model endpoint:
//!
//! - [`InferenceService`] — the trait every backend implements: one
//!   request in, one response out, every failure an
//!   [`InferenceError`](crate::error::InferenceError).
//! - [`InferenceRequest`] — instructions + user text + optional
//!   response-schema + generation settings.
//! - [`InferenceResponse`] — free text, or a JSON value when a schema was
//!   requested.
//! - [`OpenAiCompatible`] — the bundled HTTP backend speaking the
//!   OpenAI-compatible chat-completions wire format.
//!
//! # Example
//!
//! ```rust,ignore
//! use turnstile::inference::{InferenceRequest, InferenceService, OpenAiCompatible};
//!
//! let service = OpenAiCompatible::from_env()?;
//! let request = InferenceRequest::new("You are terse.", "Say hi.");
//! let response = service.complete(&request).await?;
//! println!("{}", response.text().unwrap_or_default());
//! ```

mod openai;

pub use openai::{
    API_KEY_VAR, BASE_URL_VAR, MODEL_VAR, OPENAI_API_BASE_URL, OpenAiCompatible,
    OpenAiCompatibleBuilder,
};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::InferenceError;

/// A single request to the inference service.
///
/// Carries the stage's role/instructions string, the user text for this
/// call, and — for classifier stages — a JSON Schema the response value
/// must conform to.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// System/role instructions for this call.
    pub instructions: String,
    /// The user text being classified or answered.
    pub input: String,
    /// Optional JSON Schema constraining the response shape.
    pub response_schema: Option<Value>,
    /// Schema name reported to the service when a schema is set.
    pub schema_name: Option<String>,
    /// Temperature for sampling.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Tool definitions offered to the model, in the service's function
    /// calling format.
    pub tools: Option<Vec<Value>>,
    /// Tool choice mode ("auto", "required", "none").
    pub tool_choice: Option<String>,
    /// Prior tool-call exchange messages appended after the user input.
    pub continuation: Vec<Value>,
}

impl InferenceRequest {
    /// Create a new free-text request.
    #[must_use]
    pub fn new(instructions: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            input: input.into(),
            response_schema: None,
            schema_name: None,
            temperature: None,
            max_tokens: None,
            tools: None,
            tool_choice: None,
            continuation: Vec::new(),
        }
    }

    /// Constrain the response to a JSON Schema.
    #[must_use]
    pub fn with_schema(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.schema_name = Some(name.into());
        self.response_schema = Some(schema);
        self
    }

    /// Set temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set max tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Offer tool definitions for function calling.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<Value>, choice: impl Into<String>) -> Self {
        self.tools = Some(tools);
        self.tool_choice = Some(choice.into());
        self
    }

    /// Append continuation messages from a prior tool-call exchange.
    #[must_use]
    pub fn with_continuation(mut self, messages: Vec<Value>) -> Self {
        self.continuation = messages;
        self
    }

    /// Check if this request constrains the response to a schema.
    #[must_use]
    pub const fn has_schema(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// A tool call requested by the model mid-turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    /// Provider-assigned call id, echoed back in the tool-result message.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Raw JSON arguments string as produced by the model.
    pub arguments: String,
}

/// A single response from the inference service.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    /// Free-text content, if any.
    pub text: Option<String>,
    /// Structured value conforming to the requested schema, if one was set.
    pub value: Option<Value>,
    /// Tool calls requested by the model, if any.
    pub tool_calls: Vec<ToolCallRequest>,
    /// The raw assistant message, replayed verbatim in continuations.
    pub raw_message: Option<Value>,
}

impl InferenceResponse {
    /// Create a plain text response.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            value: None,
            tool_calls: Vec::new(),
            raw_message: None,
        }
    }

    /// Create a structured response.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self {
            text: None,
            value: Some(value),
            tool_calls: Vec::new(),
            raw_message: None,
        }
    }

    /// Get the text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Check if the model requested tool calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// The trait every inference backend implements.
///
/// Implementations must convert every transport, authentication, parsing,
/// and schema failure into an [`InferenceError`] — the pipeline relies on
/// that single error kind for its conservative-failure policy.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Execute one inference call.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] if the call fails or the response
    /// cannot be parsed into the requested shape.
    async fn complete(&self, request: &InferenceRequest)
    -> Result<InferenceResponse, InferenceError>;
}

/// Reference-counted inference service handle shared across stages.
pub type SharedInferenceService = Arc<dyn InferenceService>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let req = InferenceRequest::new("inst", "text")
            .with_schema("verdict", json!({"type": "object"}))
            .with_temperature(0.2)
            .with_max_tokens(1000);

        assert!(req.has_schema());
        assert_eq!(req.schema_name.as_deref(), Some("verdict"));
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.max_tokens, Some(1000));
    }

    #[test]
    fn test_response_accessors() {
        let resp = InferenceResponse::from_text("hello");
        assert_eq!(resp.text(), Some("hello"));
        assert!(!resp.has_tool_calls());

        let resp = InferenceResponse::from_value(json!({"off_topic": true}));
        assert!(resp.text().is_none());
        assert!(resp.value.is_some());
    }
}
