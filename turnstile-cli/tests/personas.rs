//! Driver-level scenarios for the library persona with a scripted
//! inference backend.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use turnstile::error::InferenceError;
use turnstile::inference::{
    InferenceRequest, InferenceResponse, InferenceService, SharedInferenceService, ToolCallRequest,
};
use turnstile::prelude::TurnStatus;
use turnstile::session::Credentials;
use turnstile_cli::library_driver;

/// Answers the topic stage with a fixed verdict and plays back a script
/// for primary-agent calls, recording the tool results it was shown.
struct ScriptedService {
    primary: Mutex<Vec<InferenceResponse>>,
    primary_calls: AtomicUsize,
    tool_results: Mutex<Vec<String>>,
    topic: Value,
}

impl ScriptedService {
    fn new(primary: Vec<InferenceResponse>) -> Self {
        let mut primary = primary;
        primary.reverse();
        Self {
            primary: Mutex::new(primary),
            primary_calls: AtomicUsize::new(0),
            tool_results: Mutex::new(Vec::new()),
            topic: json!({"off_topic": false}),
        }
    }

    fn with_topic(mut self, verdict: Value) -> Self {
        self.topic = verdict;
        self
    }

    fn primary_call_count(&self) -> usize {
        self.primary_calls.load(Ordering::SeqCst)
    }

    fn tool_results(&self) -> Vec<String> {
        self.tool_results.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceService for ScriptedService {
    async fn complete(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        if request.has_schema() {
            return Ok(InferenceResponse::from_value(self.topic.clone()));
        }

        self.primary_calls.fetch_add(1, Ordering::SeqCst);
        for message in &request.continuation {
            if message.get("role").and_then(Value::as_str) == Some("tool") {
                if let Some(content) = message.get("content").and_then(Value::as_str) {
                    self.tool_results.lock().unwrap().push(content.to_string());
                }
            }
        }
        self.primary
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| InferenceError::service("primary script exhausted"))
    }
}

fn availability_call(arguments: &str) -> InferenceResponse {
    InferenceResponse {
        text: None,
        value: None,
        tool_calls: vec![ToolCallRequest {
            id: "call_1".to_string(),
            name: "check_availability".to_string(),
            arguments: arguments.to_string(),
        }],
        raw_message: Some(json!({
            "role": "assistant",
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "check_availability", "arguments": arguments}
            }]
        })),
    }
}

#[tokio::test]
async fn member_availability_query_runs_through_the_full_turn() {
    let service = Arc::new(ScriptedService::new(vec![
        availability_call(r#"{"title": "Enter the Agentic Ai World"}"#),
        InferenceResponse::from_text(
            "We have 5 copies of 'Enter the Agentic Ai World' available.",
        ),
    ]));
    let shared: SharedInferenceService = service.clone();
    let driver = library_driver(shared);

    let result = driver
        .run_turn(
            &Credentials::named("Hamza").with_member_id("LIB-042"),
            "How many copies of Enter the Agentic Ai World do you have?",
        )
        .await
        .unwrap();

    assert_eq!(result.status, TurnStatus::Final);
    assert!(result.answer.as_deref().unwrap().contains("5 copies"));
    assert_eq!(
        service.tool_results(),
        vec!["5 copies of 'Enter the Agentic Ai World' are available.".to_string()]
    );
    assert_eq!(service.primary_call_count(), 2);
}

#[tokio::test]
async fn availability_check_is_unavailable_without_membership() {
    let service = Arc::new(ScriptedService::new(vec![
        availability_call(r#"{"title": "Enter the Agentic Ai World"}"#),
        InferenceResponse::from_text("Availability checks are offered to members only."),
    ]));
    let shared: SharedInferenceService = service.clone();
    let driver = library_driver(shared);

    let result = driver
        .run_turn(
            &Credentials::named("Hamza"),
            "How many copies of Enter the Agentic Ai World do you have?",
        )
        .await
        .unwrap();

    assert_eq!(result.status, TurnStatus::Final);
    assert!(!result.answer.as_deref().unwrap().contains("5 copies"));
    assert_eq!(
        service.tool_results(),
        vec!["Tool 'check_availability' is not available.".to_string()]
    );
}

#[tokio::test]
async fn weather_query_blocks_at_the_library_gate() {
    let service = Arc::new(
        ScriptedService::new(vec![InferenceResponse::from_text("never reached")])
            .with_topic(json!({"off_topic": true, "reason": "not a library question"})),
    );
    let shared: SharedInferenceService = service.clone();
    let driver = library_driver(shared);

    let result = driver
        .run_turn(&Credentials::named("Hamza"), "What's the weather today?")
        .await
        .unwrap();

    assert_eq!(result.status, TurnStatus::BlockedInput);
    assert_eq!(result.reason.as_deref(), Some("not a library question"));
    assert!(result.answer.is_none());
    assert_eq!(service.primary_call_count(), 0);
}
