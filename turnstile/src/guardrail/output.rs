//! Output guardrail types and the classifier-backed safety check.
//!
//! Output guardrails validate the agent's candidate answer after
//! generation. A tripped output gate discards the candidate: the text
//! never reaches the display path.

use std::sync::Arc;

use async_trait::async_trait;

use crate::classifier::ClassifierStage;
use crate::context::SessionContext;
use crate::error::InferenceError;
use crate::verdict::SafetyVerdict;

use super::GuardrailOutput;

/// Trait for implementing output guardrail check logic.
#[async_trait]
pub trait OutputGuardrailCheck: Send + Sync {
    /// Check the agent's candidate answer and return a guardrail output.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] when the verdict cannot be
    /// determined; the caller treats this as a blocked turn, never a pass.
    async fn check(
        &self,
        context: &SessionContext,
        candidate: &str,
    ) -> Result<GuardrailOutput, InferenceError>;
}

/// An output guardrail that validates the agent's candidate answer.
///
/// Configured on an [`Agent`](crate::agent::Agent) and executed by the
/// [`TurnPipeline`](crate::agent::TurnPipeline) after the agent produces
/// a candidate and before any escalation stage runs.
#[derive(Clone)]
pub struct OutputGuardrail {
    /// Name of this guardrail (used in tracing and results).
    name: String,

    /// The guardrail check implementation.
    check: Arc<dyn OutputGuardrailCheck>,
}

impl OutputGuardrail {
    /// Create a new output guardrail with the given name and check logic.
    #[must_use]
    pub fn new(name: impl Into<String>, check: impl OutputGuardrailCheck + 'static) -> Self {
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
        candidate: &str,
    ) -> Result<OutputGuardrailResult, InferenceError> {
        let output = self.check.check(context, candidate).await?;
        Ok(OutputGuardrailResult {
            guardrail_name: self.name.clone(),
            output,
        })
    }
}

impl std::fmt::Debug for OutputGuardrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputGuardrail")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The result of running an output guardrail.
///
/// Deliberately does not carry the candidate text: a tripped gate must
/// leave nothing for the display path to leak.
#[derive(Debug, Clone)]
pub struct OutputGuardrailResult {
    /// Name of the guardrail that produced this result.
    pub guardrail_name: String,

    /// The guardrail check output.
    pub output: GuardrailOutput,
}

impl OutputGuardrailResult {
    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.output.tripwire_triggered
    }
}

/// Classifier-backed response-safety check.
///
/// Trips when the classifier returns `is_safe == false`. What counts as
/// unsafe (for example, another user's protected data, but never the
/// authenticated user's own balance) is policy in the stage's
/// instructions, not code.
pub struct SafetyCheck {
    stage: ClassifierStage<SafetyVerdict>,
}

impl SafetyCheck {
    /// Create a safety check over the given classifier stage.
    #[must_use]
    pub const fn new(stage: ClassifierStage<SafetyVerdict>) -> Self {
        Self { stage }
    }
}

impl std::fmt::Debug for SafetyCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyCheck")
            .field("stage", &self.stage)
            .finish()
    }
}

#[async_trait]
impl OutputGuardrailCheck for SafetyCheck {
    async fn check(
        &self,
        context: &SessionContext,
        candidate: &str,
    ) -> Result<GuardrailOutput, InferenceError> {
        let verdict = self.stage.classify(candidate, Some(context)).await?;
        if verdict.is_safe {
            Ok(GuardrailOutput::pass())
        } else {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "response contains content that cannot be shown".to_string());
            Ok(GuardrailOutput::tripwire(reason))
        }
    }
}
