//! Guardrail gates — pass/block checkpoints around the primary agent.
//!
//! A gate wraps a classifier verdict as a pre- or post-condition on a
//! primary agent turn. Two flavors share the same contract shape but
//! attach at different points:
//!
//! - **[`InputGuardrail`]** — runs strictly before the primary agent. A
//!   trip aborts the turn with status `BlockedInput`; the primary agent
//!   is never invoked, so no tool calls and no model spend happen beyond
//!   the gate's own classifier call.
//! - **[`OutputGuardrail`]** — runs on the candidate answer after the
//!   agent produced it. A trip discards the candidate, which must never
//!   reach the display path.
//!
//! # Tripwire Mechanism
//!
//! Each check returns a [`GuardrailOutput`] with a `tripwire_triggered`
//! flag. Multiple gates of the same flavor are evaluated independently in
//! registration order; any single trip blocks the turn (logical OR), and
//! the first tripped gate's reason is reported.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use turnstile::prelude::*;
//!
//! struct ProfanityFilter;
//!
//! #[async_trait::async_trait]
//! impl InputGuardrailCheck for ProfanityFilter {
//!     async fn check(
//!         &self,
//!         _context: &SessionContext,
//!         input: &str,
//!     ) -> Result<GuardrailOutput, InferenceError> {
//!         if input.contains("forbidden") {
//!             Ok(GuardrailOutput::tripwire("Forbidden content detected"))
//!         } else {
//!             Ok(GuardrailOutput::pass())
//!         }
//!     }
//! }
//! ```

mod input;
mod output;

pub use input::{InputGuardrail, InputGuardrailCheck, InputGuardrailResult, TopicCheck};
pub use output::{OutputGuardrail, OutputGuardrailCheck, OutputGuardrailResult, SafetyCheck};

/// The output of a guardrail check.
///
/// When `tripwire_triggered` is `true` the turn is halted at this gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailOutput {
    /// Whether the tripwire was triggered.
    pub tripwire_triggered: bool,

    /// Optional reason supplied by the check, shown to the user on a
    /// blocked turn.
    pub reason: Option<String>,
}

impl GuardrailOutput {
    /// Create a passing output (tripwire not triggered).
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            tripwire_triggered: false,
            reason: None,
        }
    }

    /// Create a blocking output (tripwire triggered) with a reason.
    #[must_use]
    pub fn tripwire(reason: impl Into<String>) -> Self {
        Self {
            tripwire_triggered: true,
            reason: Some(reason.into()),
        }
    }

    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.tripwire_triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_and_tripwire() {
        assert!(!GuardrailOutput::pass().is_triggered());

        let tripped = GuardrailOutput::tripwire("off topic");
        assert!(tripped.is_triggered());
        assert_eq!(tripped.reason.as_deref(), Some("off topic"));
    }
}
