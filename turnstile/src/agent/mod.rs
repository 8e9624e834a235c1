//! Agent configuration and the gated turn pipeline.
//!
//! An [`Agent`] bundles instructions, a tool registry, per-direction
//! guardrails, and model settings. The [`TurnPipeline`] drives one user
//! turn through the full gate sequence:
//!
//! 1. Run every input guardrail against the raw user text
//! 2. Run the agent's bounded reasoning loop (tool calls included)
//! 3. Run every output guardrail against the candidate answer
//! 4. Consult the handoff stage, then the suspicious-activity stage
//! 5. Release the candidate as the final answer
//!
//! Each stage can short-circuit the turn into exactly one terminal
//! [`TurnStatus`]; no stage after a tripped gate ever runs.

pub mod config;
pub mod pipeline;
pub mod result;

pub use config::{Agent, Instructions, ModelSettings};
pub use pipeline::TurnPipeline;
pub use result::{TurnResult, TurnStatus};
