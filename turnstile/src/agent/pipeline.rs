//! The turn pipeline — drives one user turn through every gate.
//!
//! The pipeline is strictly sequential: input gates, the agent's bounded
//! reasoning loop, output gates, the handoff stage, then the
//! suspicious-activity stage. A tripped gate ends the turn immediately;
//! nothing downstream of it runs, and an input-gate trip spends no model
//! calls on the primary agent at all.
//!
//! Inference failures at any stage abort the turn with an error rather
//! than letting the stage pass by default.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::context::SessionContext;
use crate::error::{Error, InferenceError, Result};
use crate::escalation::EscalationStage;
use crate::inference::InferenceRequest;
use crate::tool::ToolDispatch;

use super::config::Agent;
use super::result::TurnResult;

/// One agent wired to its escalation stages, executing turns.
pub struct TurnPipeline {
    agent: Agent,
    handoff: Option<EscalationStage>,
    suspicious: Option<EscalationStage>,
}

impl TurnPipeline {
    /// Create a pipeline with no escalation stages.
    #[must_use]
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            handoff: None,
            suspicious: None,
        }
    }

    /// Attach the handoff stage, consulted after the output gates pass.
    #[must_use]
    pub fn with_handoff(mut self, stage: EscalationStage) -> Self {
        self.handoff = Some(stage);
        self
    }

    /// Attach the suspicious-activity stage, consulted only when the
    /// handoff stage did not trip.
    #[must_use]
    pub fn with_suspicious(mut self, stage: EscalationStage) -> Self {
        self.suspicious = Some(stage);
        self
    }

    /// The agent this pipeline drives.
    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Execute one user turn to its single terminal state.
    ///
    /// # Errors
    ///
    /// Returns an error when any stage's inference call fails, when a
    /// tool call fails during execution, or when the reasoning loop
    /// exceeds the agent's step bound. No partial answer is released on
    /// any error path.
    pub async fn run_turn(&self, context: &SessionContext, input: &str) -> Result<TurnResult> {
        for guardrail in &self.agent.input_guardrails {
            let result = guardrail.run(context, input).await?;
            if result.is_triggered() {
                let reason = result
                    .output
                    .reason
                    .unwrap_or_else(|| format!("blocked by {}", result.guardrail_name));
                warn!(agent = %self.agent.name, gate = %result.guardrail_name, "input guardrail tripped");
                return Ok(TurnResult::blocked_input(reason));
            }
        }

        let candidate = self.run_agent_loop(context, input).await?;

        for guardrail in &self.agent.output_guardrails {
            let result = guardrail.run(context, &candidate).await?;
            if result.is_triggered() {
                let reason = result
                    .output
                    .reason
                    .unwrap_or_else(|| format!("blocked by {}", result.guardrail_name));
                warn!(agent = %self.agent.name, gate = %result.guardrail_name, "output guardrail tripped");
                return Ok(TurnResult::blocked_output(reason));
            }
        }

        if let Some(ref handoff) = self.handoff {
            let verdict = handoff.decide(input, &candidate, context).await?;
            if verdict.handoff {
                debug!(agent = %self.agent.name, reason = %verdict.reason, "turn handed off");
                return Ok(TurnResult::handed_off(verdict.reason));
            }
        }

        if let Some(ref suspicious) = self.suspicious {
            let verdict = suspicious.decide(input, &candidate, context).await?;
            if verdict.handoff {
                warn!(agent = %self.agent.name, reason = %verdict.reason, "turn flagged as suspicious");
                return Ok(TurnResult::flagged(verdict.reason));
            }
        }

        Ok(TurnResult::final_answer(candidate))
    }

    /// Run the bounded reasoning loop and return the candidate answer.
    ///
    /// Tool enablement is evaluated twice per call: once when building
    /// the advertised tool list, and again inside the registry on every
    /// dispatch, so a tool disabled for this session is never executed
    /// even if the model names it anyway.
    async fn run_agent_loop(&self, context: &SessionContext, input: &str) -> Result<String> {
        let instructions = self.agent.instructions.resolve(context);
        let specs = self.agent.tools.enabled_specs(context);
        let mut continuation: Vec<Value> = Vec::new();
        // A forced tool choice applies to the first request only; once a
        // tool has run, the model must be free to answer in text or the
        // loop could never terminate.
        let mut tool_choice = self
            .agent
            .settings
            .tool_choice
            .clone()
            .unwrap_or_else(|| "auto".to_string());

        for step in 1..=self.agent.max_steps {
            debug!(agent = %self.agent.name, step, "starting reasoning step");

            let mut request = InferenceRequest::new(&instructions, input);
            if let Some(temperature) = self.agent.settings.temperature {
                request = request.with_temperature(temperature);
            }
            if let Some(max_tokens) = self.agent.settings.max_tokens {
                request = request.with_max_tokens(max_tokens);
            }
            if !specs.is_empty() {
                request = request.with_tools(specs.clone(), tool_choice.clone());
            }
            if !continuation.is_empty() {
                request = request.with_continuation(continuation.clone());
            }

            let response = self.agent.service.complete(&request).await?;

            if !response.has_tool_calls() {
                if let Some(text) = response.text() {
                    return Ok(text.to_string());
                }
                return Err(Error::Inference(InferenceError::response_format(
                    "text answer",
                    "empty assistant message",
                )));
            }

            let assistant_message = response.raw_message.clone().ok_or_else(|| {
                Error::agent(format!(
                    "Agent '{}' received tool calls without an assistant message to replay",
                    self.agent.name
                ))
            })?;
            continuation.push(assistant_message);

            for call in &response.tool_calls {
                let dispatch = self
                    .agent
                    .tools
                    .dispatch(context, &call.name, &call.arguments)
                    .await?;
                if let ToolDispatch::Unavailable(text) = &dispatch {
                    debug!(agent = %self.agent.name, tool = %call.name, result = %text, "tool unavailable");
                }
                continuation.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": dispatch.result_text(),
                }));
            }

            tool_choice = "auto".to_string();
        }

        Err(Error::max_steps(self.agent.max_steps))
    }
}

impl std::fmt::Debug for TurnPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnPipeline")
            .field("agent", &self.agent.name)
            .field("handoff", &self.handoff.is_some())
            .field("suspicious", &self.suspicious.is_some())
            .finish()
    }
}
