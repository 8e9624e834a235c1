//! Structured classifier verdicts.
//!
//! A verdict is the entire output of one classifier stage call: one or
//! more boolean flags with a fixed, documented meaning, plus an optional
//! free-text reason. Each verdict type derives a JSON Schema (via
//! `schemars`) that is sent to the inference service as the response
//! contract; the returned payload is deserialized against the same type,
//! and a mismatch is an [`InferenceError`](crate::error::InferenceError) —
//! never a default verdict.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Verdict of a domain-relevance classifier.
///
/// `off_topic == true` means the input is outside the agent's domain and
/// the input gate must block the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TopicVerdict {
    /// True when the query is not related to the agent's domain.
    pub off_topic: bool,
    /// Optional explanation of the classification.
    #[serde(default)]
    pub reason: Option<String>,
}

impl TopicVerdict {
    /// A passing verdict (input is in-domain).
    #[must_use]
    pub const fn on_topic() -> Self {
        Self {
            off_topic: false,
            reason: None,
        }
    }

    /// A blocking verdict with a reason.
    #[must_use]
    pub fn off_topic(reason: impl Into<String>) -> Self {
        Self {
            off_topic: true,
            reason: Some(reason.into()),
        }
    }
}

/// Verdict of an output-safety classifier.
///
/// `is_safe == false` means the candidate answer contains content that
/// must not be shown and the output gate must block the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SafetyVerdict {
    /// True when the candidate answer is safe to display.
    pub is_safe: bool,
    /// Optional explanation of the classification.
    #[serde(default)]
    pub reason: Option<String>,
}

impl SafetyVerdict {
    /// A passing verdict (candidate is safe to display).
    #[must_use]
    pub const fn safe() -> Self {
        Self {
            is_safe: true,
            reason: None,
        }
    }

    /// A blocking verdict with a reason.
    #[must_use]
    pub fn unsafe_because(reason: impl Into<String>) -> Self {
        Self {
            is_safe: false,
            reason: Some(reason.into()),
        }
    }
}

/// Verdict of an escalation classifier (handoff or suspicious-activity).
///
/// `handoff == true` means the conversation leaves the automated path:
/// the candidate answer is discarded and the reason is shown instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HandoffVerdict {
    /// True when the turn must be escalated to a human operator.
    pub handoff: bool,
    /// Why the escalation decision was made.
    pub reason: String,
}

impl HandoffVerdict {
    /// A non-escalating verdict.
    #[must_use]
    pub fn stay_automated() -> Self {
        Self {
            handoff: false,
            reason: String::new(),
        }
    }

    /// An escalating verdict with a reason.
    #[must_use]
    pub fn escalate(reason: impl Into<String>) -> Self {
        Self {
            handoff: true,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_verdict_roundtrip() {
        let verdict: TopicVerdict =
            serde_json::from_str(r#"{"off_topic": true, "reason": "weather query"}"#).unwrap();
        assert!(verdict.off_topic);
        assert_eq!(verdict.reason.as_deref(), Some("weather query"));
    }

    #[test]
    fn test_reason_is_optional() {
        let verdict: TopicVerdict = serde_json::from_str(r#"{"off_topic": false}"#).unwrap();
        assert_eq!(verdict, TopicVerdict::on_topic());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        // Extra fields mean the payload does not conform to the schema.
        let result =
            serde_json::from_str::<SafetyVerdict>(r#"{"is_safe": true, "confidence": 0.9}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_handoff_requires_reason_field() {
        let result = serde_json::from_str::<HandoffVerdict>(r#"{"handoff": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_derivation() {
        let schema = serde_json::to_value(schemars::schema_for!(HandoffVerdict)).unwrap();
        let properties = schema.get("properties").unwrap();
        assert!(properties.get("handoff").is_some());
        assert!(properties.get("reason").is_some());
    }
}
