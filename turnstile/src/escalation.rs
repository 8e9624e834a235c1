//! Escalation stages — handoff routing and suspicious-activity detection.
//!
//! Both stages share one contract: given the raw user query and the
//! agent's candidate answer, decide whether the conversation leaves the
//! automated path. The escalation policy (what requires human approval,
//! what counts as anomalous) is encoded in each stage's instructions, not
//! in code.
//!
//! Ordering is enforced by the [`TurnPipeline`](crate::agent::TurnPipeline):
//! the handoff stage runs only after the output gate has passed, and the
//! suspicious-activity stage runs only if the handoff stage did not trip.
//! When a stage trips, the candidate answer is discarded and the stage's
//! reason is displayed instead.

use crate::classifier::ClassifierStage;
use crate::context::SessionContext;
use crate::error::InferenceError;
use crate::inference::SharedInferenceService;
use crate::verdict::HandoffVerdict;

/// A classifier stage deciding whether to escalate a completed turn.
pub struct EscalationStage {
    stage: ClassifierStage<HandoffVerdict>,
}

impl EscalationStage {
    /// Create an escalation stage with the given name, policy
    /// instructions, and inference service handle.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        service: SharedInferenceService,
    ) -> Self {
        Self {
            stage: ClassifierStage::new(name, instructions, service),
        }
    }

    /// The stage's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.stage.name()
    }

    /// Decide whether this turn escalates.
    ///
    /// The classifier sees the user query paired with the candidate
    /// answer, so it can judge both what was asked and what the agent is
    /// about to say.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] when the verdict cannot be
    /// determined; the pipeline escalates conservatively instead of
    /// assuming "no handoff".
    pub async fn decide(
        &self,
        user_query: &str,
        agent_output: &str,
        context: &SessionContext,
    ) -> Result<HandoffVerdict, InferenceError> {
        let text = format!("User query: {user_query}\nAgent output: {agent_output}");
        self.stage.classify(&text, Some(context)).await
    }
}

impl std::fmt::Debug for EscalationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscalationStage")
            .field("stage", &self.stage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::inference::{InferenceRequest, InferenceResponse, InferenceService};

    use super::*;

    struct CannedService(serde_json::Value);

    #[async_trait]
    impl InferenceService for CannedService {
        async fn complete(
            &self,
            request: &InferenceRequest,
        ) -> Result<InferenceResponse, InferenceError> {
            assert!(request.input.contains("User query:"));
            assert!(request.input.contains("Agent output:"));
            Ok(InferenceResponse::from_value(self.0.clone()))
        }
    }

    #[tokio::test]
    async fn test_decide_escalates_with_reason() {
        let stage = EscalationStage::new(
            "handoff",
            "Escalate transfers.",
            Arc::new(CannedService(
                json!({"handoff": true, "reason": "requires approval"}),
            )),
        );
        let ctx = SessionContext::new("Basit ali").with_pin(1234);
        let verdict = stage
            .decide("Transfer $500 to Bob", "Sure, transferring...", &ctx)
            .await
            .unwrap();

        assert!(verdict.handoff);
        assert_eq!(verdict.reason, "requires approval");
    }

    #[tokio::test]
    async fn test_decide_stays_automated() {
        let stage = EscalationStage::new(
            "handoff",
            "Escalate transfers.",
            Arc::new(CannedService(json!({"handoff": false, "reason": ""}))),
        );
        let ctx = SessionContext::new("Basit ali").with_pin(1234);
        let verdict = stage
            .decide("What is my balance?", "The balance is $5000.00", &ctx)
            .await
            .unwrap();
        assert!(!verdict.handoff);
    }
}
