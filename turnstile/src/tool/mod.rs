//! Tool traits and the per-agent tool registry.
//!
//! The [`Tool`] trait defines the interface for actions an agent may
//! invoke mid-turn. Every tool carries an enablement predicate over the
//! [`SessionContext`]: a tool that is disabled for the current session is
//! never advertised to the model, and a call routed to it anyway is
//! answered with an "unavailable" tool result rather than executed.
//!
//! # Context Gating
//!
//! Enablement is re-evaluated on every dispatch, not cached per session.
//! A tool can therefore gate on anything the context carries — verified
//! credentials, a membership id, a premium flag — and changes to the
//! context take effect on the next call.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use turnstile::tool::{Tool, ToolDefinition, ToolRegistry};
//!
//! struct Timings;
//!
//! #[async_trait::async_trait]
//! impl Tool for Timings {
//!     fn name(&self) -> &str {
//!         "library_timings"
//!     }
//!
//!     fn definition(&self) -> ToolDefinition {
//!         ToolDefinition::new("library_timings", "Opening hours of the library.")
//!     }
//!
//!     async fn call(
//!         &self,
//!         _context: &SessionContext,
//!         _args: serde_json::Value,
//!     ) -> Result<String, ToolError> {
//!         Ok("The library is open from 9 AM to 8 PM.".to_string())
//!     }
//! }
//!
//! let mut registry = ToolRegistry::new();
//! registry.add(Timings);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::context::SessionContext;
use crate::error::ToolError;

/// A tool definition as advertised to the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    /// The tool's name.
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON schema of the tool's arguments.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a definition for a tool that takes no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: json!({"type": "object", "properties": {}, "required": []}),
        }
    }

    /// Set the argument schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Render this definition in the chat-completions `function` format.
    #[must_use]
    pub fn to_function_spec(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// An action an agent may invoke during a turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name, used to route model tool calls.
    fn name(&self) -> &str;

    /// The definition advertised to the model when the tool is enabled.
    fn definition(&self) -> ToolDefinition;

    /// Whether this tool is available for the given session.
    ///
    /// Defaults to always enabled. Implementations gate on whatever the
    /// context carries; the result is consulted on every dispatch.
    fn enabled(&self, _context: &SessionContext) -> bool {
        true
    }

    /// Execute the tool with the model-provided arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when the arguments are malformed or the
    /// action fails. An error here fails the whole turn; tools that want
    /// to report a recoverable condition return it as result text.
    async fn call(&self, context: &SessionContext, args: Value) -> Result<String, ToolError>;
}

/// Outcome of routing one model tool call through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolDispatch {
    /// The tool ran and produced result text.
    Completed(String),
    /// The tool is not registered or not enabled for this session. The
    /// contained text is reported back to the model as the tool result.
    Unavailable(String),
}

impl ToolDispatch {
    /// The text to feed back to the model as the tool result.
    #[must_use]
    pub fn result_text(&self) -> &str {
        match self {
            Self::Completed(text) | Self::Unavailable(text) => text,
        }
    }
}

/// A collection of tools attached to one agent.
///
/// Iteration order is deterministic (sorted by tool name) so the model
/// sees a stable tool list across turns.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A tool with the same name is replaced.
    pub fn add(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    /// Register an already-shared tool.
    pub fn add_shared(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Whether a tool with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools, enabled or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions of every tool enabled under the given context.
    ///
    /// Disabled tools are omitted entirely; the model never learns they
    /// exist.
    #[must_use]
    pub fn list_enabled(&self, context: &SessionContext) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .filter(|tool| tool.enabled(context))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Function specs for every tool enabled under the given context.
    #[must_use]
    pub fn enabled_specs(&self, context: &SessionContext) -> Vec<Value> {
        self.list_enabled(context)
            .iter()
            .map(ToolDefinition::to_function_spec)
            .collect()
    }

    /// Route one model tool call to its tool.
    ///
    /// Unknown and disabled tools are reported as
    /// [`ToolDispatch::Unavailable`] so the turn can continue with that
    /// text as the tool result.
    ///
    /// # Errors
    ///
    /// Propagates the tool's own [`ToolError`] when execution fails.
    pub async fn dispatch(
        &self,
        context: &SessionContext,
        name: &str,
        arguments: &str,
    ) -> Result<ToolDispatch, ToolError> {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!(tool = name, "tool call routed to unknown tool");
            return Ok(ToolDispatch::Unavailable(format!(
                "Tool '{name}' is not available."
            )));
        };
        if !tool.enabled(context) {
            tracing::debug!(tool = name, user = %context.name, "tool disabled for session");
            return Ok(ToolDispatch::Unavailable(format!(
                "Tool '{name}' is not available."
            )));
        }

        let args: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(arguments).map_err(|e| {
                ToolError::InvalidArguments(format!("tool '{name}' received invalid JSON: {e}"))
            })?
        };

        tracing::debug!(tool = name, "dispatching tool call");
        let output = tool.call(context, args).await?;
        Ok(ToolDispatch::Completed(output))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("echo", "Echo the input back.").with_parameters(json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }))
        }

        async fn call(&self, _context: &SessionContext, args: Value) -> Result<String, ToolError> {
            let text = args
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| ToolError::InvalidArguments("missing 'text'".to_string()))?;
            Ok(text.to_string())
        }
    }

    struct MembersOnly;

    #[async_trait]
    impl Tool for MembersOnly {
        fn name(&self) -> &str {
            "members_only"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("members_only", "Requires a member id.")
        }

        fn enabled(&self, context: &SessionContext) -> bool {
            context.has_member_id()
        }

        async fn call(
            &self,
            _context: &SessionContext,
            _args: Value,
        ) -> Result<String, ToolError> {
            Ok("welcome, member".to_string())
        }
    }

    #[test]
    fn test_function_spec_shape() {
        let spec = Echo.definition().to_function_spec();
        assert_eq!(spec["type"], "function");
        assert_eq!(spec["function"]["name"], "echo");
        assert_eq!(spec["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_enabled_specs_omit_gated_tools() {
        let mut registry = ToolRegistry::new();
        registry.add(Echo);
        registry.add(MembersOnly);

        let guest = SessionContext::new("guest");
        let specs = registry.enabled_specs(&guest);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0]["function"]["name"], "echo");

        let member = SessionContext::new("pat").with_member_id("M-100");
        assert_eq!(registry.enabled_specs(&member).len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_runs_enabled_tool() {
        let mut registry = ToolRegistry::new();
        registry.add(Echo);
        let ctx = SessionContext::new("guest");

        let out = registry
            .dispatch(&ctx, "echo", r#"{"text": "hi"}"#)
            .await
            .unwrap();
        assert_eq!(out, ToolDispatch::Completed("hi".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_disabled_tool_is_unavailable() {
        let mut registry = ToolRegistry::new();
        registry.add(MembersOnly);
        let ctx = SessionContext::new("guest");

        let out = registry.dispatch(&ctx, "members_only", "{}").await.unwrap();
        assert!(matches!(out, ToolDispatch::Unavailable(_)));
        assert!(out.result_text().contains("not available"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_is_unavailable() {
        let registry = ToolRegistry::new();
        let ctx = SessionContext::new("guest");
        let out = registry.dispatch(&ctx, "missing", "{}").await.unwrap();
        assert!(matches!(out, ToolDispatch::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_malformed_arguments() {
        let mut registry = ToolRegistry::new();
        registry.add(Echo);
        let ctx = SessionContext::new("guest");
        let err = registry.dispatch(&ctx, "echo", "not json").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_empty_arguments_treated_as_empty_object() {
        let mut registry = ToolRegistry::new();
        registry.add(MembersOnly);
        let ctx = SessionContext::new("pat").with_member_id("M-100");
        let out = registry.dispatch(&ctx, "members_only", "").await.unwrap();
        assert_eq!(out, ToolDispatch::Completed("welcome, member".to_string()));
    }
}
