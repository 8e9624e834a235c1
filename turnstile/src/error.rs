//! Unified error types for the turnstile pipeline.
//!
//! This module provides the error hierarchy covering:
//! - Startup configuration errors (missing credentials)
//! - Inference service errors (transport, auth, non-conforming payloads)
//! - Tool execution errors
//! - Turn-level pipeline errors
//!
//! The pipeline's cardinal rule is that an [`InferenceError`] is never an
//! implicit pass: a stage that cannot determine its verdict fails the turn
//! conservatively instead of defaulting to "safe" or "on-topic".

use std::fmt;

/// Result type alias for turnstile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the turnstile pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Startup configuration error; fatal before any turn runs.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed user-supplied structured input; the caller re-prompts for
    /// this turn only.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The inference service failed or returned a non-conforming payload.
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Tool execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Agent configuration or runtime error.
    #[error("Agent error: {0}")]
    Agent(String),

    /// Maximum steps reached during the agent loop without a final answer.
    #[error("Maximum steps ({max_steps}) reached without final answer")]
    MaxSteps {
        /// The maximum number of steps configured.
        max_steps: usize,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an agent error with a message.
    #[must_use]
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Create a validation error with a message.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a max steps error.
    #[must_use]
    pub const fn max_steps(max_steps: usize) -> Self {
        Self::MaxSteps { max_steps }
    }
}

/// Startup configuration errors.
///
/// These are fatal: the process must exit before any turn runs. They are
/// produced while reading credentials from the environment, never at
/// turn time.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("required environment variable {0} is not set")]
    MissingVar(String),

    /// A configuration value is present but unusable.
    #[error("invalid configuration for {name}: {reason}")]
    Invalid {
        /// The configuration entry that failed.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a missing environment variable error.
    #[must_use]
    pub fn missing_var(var: impl Into<String>) -> Self {
        Self::MissingVar(var.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Error type for inference service operations.
///
/// Every stage call that fails, times out, or yields a payload that does
/// not conform to the requested schema surfaces as one of these. Callers
/// treat any kind as "cannot determine verdict" and escalate conservatively.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct InferenceError {
    /// The error kind.
    pub kind: InferenceErrorKind,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the service.
    pub code: Option<String>,
}

/// Categories of inference errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InferenceErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Rate limit exceeded.
    RateLimited,
    /// The call exceeded its bounded wait time.
    Timeout,
    /// Network or connection error.
    Network,
    /// The response body could not be parsed at all.
    ResponseFormat,
    /// The response parsed but does not conform to the requested schema.
    Schema,
    /// HTTP status error.
    HttpStatus,
    /// Service-specific error.
    Service,
    /// Internal error.
    Internal,
}

impl InferenceError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: InferenceErrorKind::Auth,
            message: message.into(),
            code: None,
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited() -> Self {
        Self {
            kind: InferenceErrorKind::RateLimited,
            message: "Rate limit exceeded. Please retry after some time.".into(),
            code: None,
        }
    }

    /// Create a timeout error for a stage's bounded wait.
    #[must_use]
    pub fn timeout(stage: impl Into<String>) -> Self {
        Self {
            kind: InferenceErrorKind::Timeout,
            message: format!("stage '{}' exceeded its bounded wait time", stage.into()),
            code: None,
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: InferenceErrorKind::Network,
            message: message.into(),
            code: None,
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self {
            kind: InferenceErrorKind::ResponseFormat,
            message: format!("Expected {}, got {}", expected.into(), got.into()),
            code: None,
        }
    }

    /// Create a schema mismatch error for a non-conforming structured payload.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            kind: InferenceErrorKind::Schema,
            message: message.into(),
            code: None,
        }
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: InferenceErrorKind::HttpStatus,
            message: format!("HTTP {status}: {}", body.into()),
            code: Some(status.to_string()),
        }
    }

    /// Create a service-specific error.
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self {
            kind: InferenceErrorKind::Service,
            message: message.into(),
            code: None,
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: InferenceErrorKind::Internal,
            message: message.into(),
            code: None,
        }
    }

    /// Check if this is a retryable error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            InferenceErrorKind::RateLimited | InferenceErrorKind::Network
        )
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for InferenceError {}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self {
                kind: InferenceErrorKind::Timeout,
                message: "Request timed out".into(),
                code: None,
            }
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Error type for tool execution failures.
///
/// A tool disabled by its enablement predicate does not produce a
/// `ToolError`: it is reported as unavailable in the tool-result text and
/// the turn continues. These errors cover tools that were dispatched and
/// then failed, which the pipeline maps to a turn-level failure.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Error during tool execution.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Invalid arguments provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool not found in the registry.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Generic error.
    #[error("Tool error: {0}")]
    Other(String),
}

impl ToolError {
    /// Create an execution error.
    #[must_use]
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_error_display() {
        let err = InferenceError::http_status(429, "slow down");
        assert_eq!(err.to_string(), "HTTP 429: slow down (code: 429)");
        assert_eq!(err.kind, InferenceErrorKind::HttpStatus);
    }

    #[test]
    fn test_inference_error_retryable() {
        assert!(InferenceError::rate_limited().is_retryable());
        assert!(InferenceError::network("boom").is_retryable());
        assert!(!InferenceError::schema("bad payload").is_retryable());
        assert!(!InferenceError::timeout("input-gate").is_retryable());
    }

    #[test]
    fn test_timeout_names_the_stage() {
        let err = InferenceError::timeout("handoff");
        assert_eq!(err.kind, InferenceErrorKind::Timeout);
        assert!(err.message.contains("handoff"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::missing_var("TURNSTILE_API_KEY");
        assert_eq!(
            err.to_string(),
            "required environment variable TURNSTILE_API_KEY is not set"
        );
    }

    #[test]
    fn test_tool_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ToolError::from(json_err);
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
