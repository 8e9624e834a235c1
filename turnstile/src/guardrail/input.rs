//! Input guardrail types and the classifier-backed topic check.
//!
//! Input guardrails validate user input before the primary agent runs,
//! rejecting off-topic or policy-violating requests without spending a
//! primary-agent model call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::classifier::ClassifierStage;
use crate::context::SessionContext;
use crate::error::InferenceError;
use crate::verdict::TopicVerdict;

use super::GuardrailOutput;

/// Trait for implementing input guardrail check logic.
///
/// The [`check`](InputGuardrailCheck::check) method receives the session
/// context and the raw user input for this turn, and returns a
/// [`GuardrailOutput`] indicating whether the input passes.
#[async_trait]
pub trait InputGuardrailCheck: Send + Sync {
    /// Check the user input and return a guardrail output.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] when the verdict cannot be
    /// determined; the caller treats this as a blocked turn, never a pass.
    async fn check(
        &self,
        context: &SessionContext,
        input: &str,
    ) -> Result<GuardrailOutput, InferenceError>;
}

/// An input guardrail that validates user input before the agent runs.
///
/// Configured on an [`Agent`](crate::agent::Agent) and executed by the
/// [`TurnPipeline`](crate::agent::TurnPipeline) as the first stage of a
/// turn, strictly before any primary-agent inference call.
#[derive(Clone)]
pub struct InputGuardrail {
    /// Name of this guardrail (used in tracing and results).
    name: String,

    /// The guardrail check implementation.
    check: Arc<dyn InputGuardrailCheck>,
}

impl InputGuardrail {
    /// Create a new input guardrail with the given name and check logic.
    #[must_use]
    pub fn new(name: impl Into<String>, check: impl InputGuardrailCheck + 'static) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Returns the name of this guardrail.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute this guardrail check.
    ///
    /// # Errors
    ///
    /// Propagates the check's [`InferenceError`].
    pub async fn run(
        &self,
        context: &SessionContext,
        input: &str,
    ) -> Result<InputGuardrailResult, InferenceError> {
        let output = self.check.check(context, input).await?;
        Ok(InputGuardrailResult {
            guardrail_name: self.name.clone(),
            output,
        })
    }
}

impl std::fmt::Debug for InputGuardrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputGuardrail")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The result of running an input guardrail.
#[derive(Debug, Clone)]
pub struct InputGuardrailResult {
    /// Name of the guardrail that produced this result.
    pub guardrail_name: String,

    /// The guardrail check output.
    pub output: GuardrailOutput,
}

impl InputGuardrailResult {
    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.output.tripwire_triggered
    }
}

/// Classifier-backed domain-relevance check.
///
/// Trips when the classifier returns `off_topic == true`. The domain
/// policy lives entirely in the stage's instructions, not in code.
pub struct TopicCheck {
    stage: ClassifierStage<TopicVerdict>,
}

impl TopicCheck {
    /// Create a topic check over the given classifier stage.
    #[must_use]
    pub const fn new(stage: ClassifierStage<TopicVerdict>) -> Self {
        Self { stage }
    }
}

impl std::fmt::Debug for TopicCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicCheck")
            .field("stage", &self.stage)
            .finish()
    }
}

#[async_trait]
impl InputGuardrailCheck for TopicCheck {
    async fn check(
        &self,
        context: &SessionContext,
        input: &str,
    ) -> Result<GuardrailOutput, InferenceError> {
        let verdict = self.stage.classify(input, Some(context)).await?;
        if verdict.off_topic {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "query is outside this agent's domain".to_string());
            Ok(GuardrailOutput::tripwire(reason))
        } else {
            Ok(GuardrailOutput::pass())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::Arc;

    use crate::inference::{InferenceRequest, InferenceResponse, InferenceService};

    use super::*;

    struct CannedService(serde_json::Value);

    #[async_trait]
    impl InferenceService for CannedService {
        async fn complete(
            &self,
            _request: &InferenceRequest,
        ) -> Result<InferenceResponse, InferenceError> {
            Ok(InferenceResponse::from_value(self.0.clone()))
        }
    }

    fn topic_gate(payload: serde_json::Value) -> InputGuardrail {
        let stage = ClassifierStage::new("topic", "Is this banking?", Arc::new(CannedService(payload)));
        InputGuardrail::new("bank-topic", TopicCheck::new(stage))
    }

    #[tokio::test]
    async fn test_off_topic_trips_with_reason() {
        let gate = topic_gate(json!({"off_topic": true, "reason": "weather query"}));
        let ctx = SessionContext::new("Basit ali");
        let result = gate.run(&ctx, "What's the weather?").await.unwrap();

        assert!(result.is_triggered());
        assert_eq!(result.guardrail_name, "bank-topic");
        assert_eq!(result.output.reason.as_deref(), Some("weather query"));
    }

    #[tokio::test]
    async fn test_on_topic_passes() {
        let gate = topic_gate(json!({"off_topic": false}));
        let ctx = SessionContext::new("Basit ali");
        let result = gate.run(&ctx, "What is my balance?").await.unwrap();
        assert!(!result.is_triggered());
    }

    #[tokio::test]
    async fn test_tripwire_without_reason_gets_default() {
        let gate = topic_gate(json!({"off_topic": true}));
        let ctx = SessionContext::new("Basit ali");
        let result = gate.run(&ctx, "Cook me dinner").await.unwrap();
        assert!(result.output.reason.is_some());
    }
}
