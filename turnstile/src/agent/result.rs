//! Turn outcomes.

use uuid::Uuid;

/// The terminal state of one user turn. Exactly one applies per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TurnStatus {
    /// The candidate answer passed every gate and was released.
    Final,
    /// An input guardrail tripped before the agent ran.
    BlockedInput,
    /// An output guardrail tripped on the candidate answer.
    BlockedOutput,
    /// The handoff stage routed the turn to a human.
    HandedOff,
    /// The suspicious-activity stage flagged the turn.
    Flagged,
}

impl TurnStatus {
    /// Whether the candidate answer was released to the user.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Final)
    }
}

/// The outcome of one turn through the pipeline.
///
/// Blocked, handed-off, and flagged results never carry the candidate
/// answer; only `reason` is available for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    /// Unique id for this turn, for log correlation.
    pub id: Uuid,
    /// The terminal state reached.
    pub status: TurnStatus,
    /// The released answer. Present only when `status` is
    /// [`TurnStatus::Final`].
    pub answer: Option<String>,
    /// Why the turn did not finish normally. Present for every
    /// non-final status.
    pub reason: Option<String>,
}

impl TurnResult {
    /// A released final answer.
    #[must_use]
    pub fn final_answer(answer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: TurnStatus::Final,
            answer: Some(answer.into()),
            reason: None,
        }
    }

    /// A turn stopped by an input guardrail.
    #[must_use]
    pub fn blocked_input(reason: impl Into<String>) -> Self {
        Self::non_final(TurnStatus::BlockedInput, reason)
    }

    /// A turn stopped by an output guardrail. The candidate answer is
    /// discarded, not stored here.
    #[must_use]
    pub fn blocked_output(reason: impl Into<String>) -> Self {
        Self::non_final(TurnStatus::BlockedOutput, reason)
    }

    /// A turn routed to a human.
    #[must_use]
    pub fn handed_off(reason: impl Into<String>) -> Self {
        Self::non_final(TurnStatus::HandedOff, reason)
    }

    /// A turn flagged as suspicious.
    #[must_use]
    pub fn flagged(reason: impl Into<String>) -> Self {
        Self::non_final(TurnStatus::Flagged, reason)
    }

    fn non_final(status: TurnStatus, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            answer: None,
            reason: Some(reason.into()),
        }
    }

    /// The single line to display for this turn.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self.status {
            TurnStatus::Final => self.answer.clone().unwrap_or_default(),
            TurnStatus::BlockedInput => format!(
                "I can't help with that: {}",
                self.reason.as_deref().unwrap_or("request blocked")
            ),
            TurnStatus::BlockedOutput => format!(
                "I can't share that response: {}",
                self.reason.as_deref().unwrap_or("response withheld")
            ),
            TurnStatus::HandedOff => format!(
                "Transferring you to a human agent: {}",
                self.reason.as_deref().unwrap_or("human review required")
            ),
            TurnStatus::Flagged => format!(
                "This request has been flagged for review: {}",
                self.reason.as_deref().unwrap_or("unusual activity")
            ),
        }
    }
}
