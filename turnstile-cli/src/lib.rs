//! Turnstile CLI library — demo personas and the interactive REPL.
//!
//! This crate wires the turnstile pipeline into three runnable demo
//! agents: a gated bank agent, a library assistant, and an ungated
//! support agent.

pub mod personas;
pub mod repl;

pub use personas::{bank_driver, library_driver, support_driver};
pub use repl::Repl;
