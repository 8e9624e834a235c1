//! Agent configuration: instructions, model settings, and the builder.

use std::sync::Arc;

use crate::context::SessionContext;
use crate::guardrail::{InputGuardrail, OutputGuardrail};
use crate::inference::SharedInferenceService;
use crate::tool::{Tool, ToolRegistry};

/// Default bound on reasoning steps within one turn.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Callback resolving instructions from the session context.
pub type InstructionsFn = dyn Fn(&SessionContext) -> String + Send + Sync;

/// System instructions for an agent, fixed or derived per turn.
#[derive(Clone)]
pub enum Instructions {
    /// The same instructions on every turn.
    Static(String),
    /// Instructions computed from the session context at the start of
    /// each turn, so they can address the user by name or adapt to the
    /// session's state.
    Dynamic(Arc<InstructionsFn>),
}

impl Instructions {
    /// Resolve the instructions for this turn.
    #[must_use]
    pub fn resolve(&self, context: &SessionContext) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Dynamic(f) => f(context),
        }
    }
}

impl std::fmt::Debug for Instructions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for Instructions {
    fn from(text: &str) -> Self {
        Self::Static(text.to_string())
    }
}

impl From<String> for Instructions {
    fn from(text: String) -> Self {
        Self::Static(text)
    }
}

/// Per-agent model parameters sent with every primary-agent request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSettings {
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Response token cap.
    pub max_tokens: Option<u32>,
    /// Tool choice directive, e.g. `"auto"` or `"required"`.
    pub tool_choice: Option<String>,
}

impl ModelSettings {
    /// Settings with every field left to the provider's defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the response token cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the tool choice directive.
    #[must_use]
    pub fn with_tool_choice(mut self, tool_choice: impl Into<String>) -> Self {
        self.tool_choice = Some(tool_choice.into());
        self
    }
}

/// A configured agent: instructions, tools, guardrails, and settings.
///
/// Built with chained setters:
///
/// ```rust,ignore
/// let agent = Agent::new("Bank Agent", service)
///     .instructions(Instructions::Dynamic(Arc::new(|ctx| {
///         format!("You are a bank agent. The user is {}.", ctx.name)
///     })))
///     .tool(CheckBalance::new(store))
///     .input_guardrail(topic_gate)
///     .settings(ModelSettings::new().with_temperature(0.2));
/// ```
pub struct Agent {
    /// The agent's display name, used in logs.
    pub name: String,
    /// System instructions, resolved once per turn.
    pub instructions: Instructions,
    /// Tools available to this agent, subject to per-session enablement.
    pub tools: ToolRegistry,
    /// Gates run against the raw user input before any reasoning.
    pub input_guardrails: Vec<InputGuardrail>,
    /// Gates run against the candidate answer before release.
    pub output_guardrails: Vec<OutputGuardrail>,
    /// The inference service backing the reasoning loop.
    pub service: SharedInferenceService,
    /// Model parameters for every primary request.
    pub settings: ModelSettings,
    /// Bound on reasoning steps within one turn.
    pub max_steps: usize,
}

impl Agent {
    /// Create an agent with empty instructions and no tools or gates.
    #[must_use]
    pub fn new(name: impl Into<String>, service: SharedInferenceService) -> Self {
        Self {
            name: name.into(),
            instructions: Instructions::Static(String::new()),
            tools: ToolRegistry::new(),
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
            service,
            settings: ModelSettings::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Set the agent's instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<Instructions>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Register a tool.
    #[must_use]
    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.add(tool);
        self
    }

    /// Add an input guardrail. Gates run in the order they are added.
    #[must_use]
    pub fn input_guardrail(mut self, guardrail: InputGuardrail) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    /// Add an output guardrail. Gates run in the order they are added.
    #[must_use]
    pub fn output_guardrail(mut self, guardrail: OutputGuardrail) -> Self {
        self.output_guardrails.push(guardrail);
        self
    }

    /// Set the model parameters.
    #[must_use]
    pub fn settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the per-turn reasoning step bound.
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("instructions", &self.instructions)
            .field("tools", &self.tools)
            .field("input_guardrails", &self.input_guardrails.len())
            .field("output_guardrails", &self.output_guardrails.len())
            .field("settings", &self.settings)
            .field("max_steps", &self.max_steps)
            .finish_non_exhaustive()
    }
}
