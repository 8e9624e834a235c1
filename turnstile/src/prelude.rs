//! Convenience re-exports for building and driving pipelines.

pub use crate::agent::{
    Agent, Instructions, ModelSettings, TurnPipeline, TurnResult, TurnStatus,
};
pub use crate::classifier::ClassifierStage;
pub use crate::context::{
    InMemoryRecordStore, RecordStore, SessionContext, SharedRecordStore,
};
pub use crate::error::{ConfigError, Error, InferenceError, Result, ToolError};
pub use crate::escalation::EscalationStage;
pub use crate::guardrail::{
    GuardrailOutput, InputGuardrail, InputGuardrailCheck, OutputGuardrail, OutputGuardrailCheck,
    SafetyCheck, TopicCheck,
};
pub use crate::inference::{
    InferenceRequest, InferenceResponse, InferenceService, OpenAiCompatible,
    SharedInferenceService,
};
pub use crate::session::{Credentials, SessionDriver};
pub use crate::tool::{Tool, ToolDefinition, ToolRegistry};
pub use crate::tools::{BookCatalog, CheckAvailability, CheckBalance, LibraryTimings, SearchBook};
pub use crate::verdict::{HandoffVerdict, SafetyVerdict, TopicVerdict};
