//! Turnstile is a gated multi-stage decision pipeline for LLM-backed
//! agents.
//!
//! Every user turn passes through a fixed sequence of checkpoints
//! before an answer is released: input guardrails, the agent's bounded
//! tool-calling loop, output guardrails, a human-handoff stage, and a
//! suspicious-activity stage. Each checkpoint is a classifier call with
//! a schema-constrained verdict; any tripped checkpoint ends the turn
//! with a reason instead of an answer, and any inference failure aborts
//! the turn rather than waving it through.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use turnstile::prelude::*;
//!
//! let service: SharedInferenceService = Arc::new(OpenAiCompatible::from_env()?);
//! let store = Arc::new(InMemoryRecordStore::demo_bank());
//!
//! let agent = Agent::new("Bank Agent", Arc::clone(&service))
//!     .instructions("You are a helpful bank agent.")
//!     .tool(CheckBalance::new(Arc::clone(&store) as _));
//!
//! let driver = SessionDriver::new(TurnPipeline::new(agent));
//! let credentials = Credentials::named("Basit ali").with_pin("1234");
//! let outcome = driver.display_turn(&credentials, "What is my balance?").await?;
//! ```

pub mod agent;
pub mod classifier;
pub mod context;
pub mod error;
pub mod escalation;
pub mod guardrail;
pub mod inference;
pub mod prelude;
pub mod session;
pub mod tool;
pub mod tools;
pub mod verdict;

pub use agent::{Agent, TurnPipeline, TurnResult, TurnStatus};
pub use error::{Error, Result};
pub use session::{Credentials, SessionDriver};
