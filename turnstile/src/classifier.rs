//! Classifier stages — narrow, single-purpose inference calls.
//!
//! A [`ClassifierStage`] maps `(text, context)` to one structured
//! [verdict](crate::verdict) through exactly one inference call. The
//! verdict type's JSON Schema (derived via `schemars`) is sent as the
//! response contract, and the returned payload is deserialized against
//! the same type at the boundary.
//!
//! # Failure policy
//!
//! A stage never guesses. If the inference service errors, exceeds the
//! stage's bounded wait, or returns a payload that does not conform to
//! the schema, [`classify`](ClassifierStage::classify) fails with an
//! [`InferenceError`] and the caller escalates conservatively — "cannot
//! determine verdict" is never treated as "safe" or "on-topic".

use std::marker::PhantomData;
use std::time::Duration;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::context::SessionContext;
use crate::error::InferenceError;
use crate::inference::{InferenceRequest, SharedInferenceService};

const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// A single-purpose classifier producing verdicts of type `V`.
pub struct ClassifierStage<V> {
    name: String,
    instructions: String,
    service: SharedInferenceService,
    timeout: Duration,
    _verdict: PhantomData<fn() -> V>,
}

impl<V> ClassifierStage<V>
where
    V: DeserializeOwned + JsonSchema,
{
    /// Create a new stage with the given name, policy instructions, and
    /// inference service handle.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        service: SharedInferenceService,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            service,
            timeout: DEFAULT_STAGE_TIMEOUT,
            _verdict: PhantomData,
        }
    }

    /// Set the bounded wait time for the stage's inference call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The stage's name (used in tracing and error messages).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classify the given text, optionally in a session context.
    ///
    /// Makes exactly one inference call, schema-constrained to `V`.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] when the call fails, exceeds the
    /// bounded wait, or yields a payload that does not deserialize as `V`.
    pub async fn classify(
        &self,
        text: &str,
        context: Option<&SessionContext>,
    ) -> Result<V, InferenceError> {
        let input = match context {
            Some(ctx) => format!("Session user: {}\n{text}", ctx.name),
            None => text.to_string(),
        };

        let schema = serde_json::to_value(schemars::schema_for!(V))
            .map_err(|e| InferenceError::internal(e.to_string()))?;

        let request =
            InferenceRequest::new(&self.instructions, input).with_schema(&self.name, schema);

        tracing::debug!(stage = %self.name, "classifier call");

        let response = tokio::time::timeout(self.timeout, self.service.complete(&request))
            .await
            .map_err(|_| InferenceError::timeout(&self.name))??;

        let value = response.value.ok_or_else(|| {
            InferenceError::response_format("structured verdict", "free text response")
        })?;

        serde_json::from_value(value).map_err(|e| {
            InferenceError::schema(format!(
                "stage '{}' returned a non-conforming verdict: {e}",
                self.name
            ))
        })
    }
}

impl<V> std::fmt::Debug for ClassifierStage<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierStage")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::inference::{InferenceRequest, InferenceResponse, InferenceService};
    use crate::verdict::TopicVerdict;

    use super::*;

    struct CannedService {
        payload: serde_json::Value,
    }

    #[async_trait]
    impl InferenceService for CannedService {
        async fn complete(
            &self,
            request: &InferenceRequest,
        ) -> Result<InferenceResponse, InferenceError> {
            assert!(request.has_schema(), "classifier must send a schema");
            Ok(InferenceResponse::from_value(self.payload.clone()))
        }
    }

    fn stage(payload: serde_json::Value) -> ClassifierStage<TopicVerdict> {
        let service = Arc::new(CannedService { payload });
        ClassifierStage::new("topic", "Classify the topic.", service)
    }

    #[tokio::test]
    async fn test_classify_conforming_payload() {
        let stage = stage(json!({"off_topic": true, "reason": "weather"}));
        let verdict = stage.classify("What's the weather?", None).await.unwrap();
        assert!(verdict.off_topic);
    }

    #[tokio::test]
    async fn test_classify_non_conforming_payload_is_schema_error() {
        let stage = stage(json!({"verdict": "who knows"}));
        let err = stage.classify("hello", None).await.unwrap_err();
        assert_eq!(err.kind, crate::error::InferenceErrorKind::Schema);
    }

    #[tokio::test]
    async fn test_classify_includes_context_user() {
        struct CaptureService;

        #[async_trait]
        impl InferenceService for CaptureService {
            async fn complete(
                &self,
                request: &InferenceRequest,
            ) -> Result<InferenceResponse, InferenceError> {
                assert!(request.input.starts_with("Session user: Basit ali"));
                Ok(InferenceResponse::from_value(json!({"off_topic": false})))
            }
        }

        let stage: ClassifierStage<TopicVerdict> =
            ClassifierStage::new("topic", "inst", Arc::new(CaptureService));
        let ctx = crate::context::SessionContext::new("Basit ali");
        let verdict = stage.classify("balance?", Some(&ctx)).await.unwrap();
        assert!(!verdict.off_topic);
    }

    #[tokio::test]
    async fn test_classify_times_out() {
        struct SlowService;

        #[async_trait]
        impl InferenceService for SlowService {
            async fn complete(
                &self,
                _request: &InferenceRequest,
            ) -> Result<InferenceResponse, InferenceError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(InferenceResponse::from_value(json!({"off_topic": false})))
            }
        }

        let stage: ClassifierStage<TopicVerdict> =
            ClassifierStage::new("topic", "inst", Arc::new(SlowService))
                .with_timeout(Duration::from_millis(10));
        let err = stage.classify("hello", None).await.unwrap_err();
        assert_eq!(err.kind, crate::error::InferenceErrorKind::Timeout);
    }
}
