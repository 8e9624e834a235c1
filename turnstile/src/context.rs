//! Per-turn session context and the domain record store.
//!
//! A [`SessionContext`] carries the identity fields a turn needs for
//! authorization decisions. It is constructed fresh for every CLI
//! iteration, passed by reference into each stage for that turn only, and
//! never persisted across turns — enablement predicates are re-evaluated
//! against it at every tool call precisely because a new context can carry
//! new credentials.
//!
//! The [`RecordStore`] is the domain-specific source of truth the context
//! must validate against before any tool that reads protected data is
//! enabled.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;

/// Identity fields for one turn.
///
/// Immutable for the duration of a turn. The builder methods store
/// already-validated values; use [`parse_pin`] to validate raw PIN input
/// before construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// The user's name as entered at the prompt.
    pub name: String,
    /// Validated 4-digit PIN, when the persona requires one.
    pub pin: Option<u32>,
    /// Library/member identifier, when the persona uses one.
    pub member_id: Option<String>,
    /// Premium membership flag.
    pub premium: bool,
    /// Free-form issue category for support-style personas.
    pub issue_category: Option<String>,
}

impl SessionContext {
    /// Create a context for the named user.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pin: None,
            member_id: None,
            premium: false,
            issue_category: None,
        }
    }

    /// Attach a validated PIN.
    #[must_use]
    pub const fn with_pin(mut self, pin: u32) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Attach a member id.
    #[must_use]
    pub fn with_member_id(mut self, member_id: impl Into<String>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    /// Set the premium membership flag.
    #[must_use]
    pub const fn with_premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }

    /// Attach an issue category.
    #[must_use]
    pub fn with_issue_category(mut self, category: impl Into<String>) -> Self {
        self.issue_category = Some(category.into());
        self
    }

    /// Check whether the context carries a non-empty member id.
    #[must_use]
    pub fn has_member_id(&self) -> bool {
        self.member_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}

/// Parse and range-check a raw PIN string.
///
/// PINs are exactly four digits (1000..=9999).
///
/// # Errors
///
/// Returns [`Error::Validation`] when the input is not a number in range;
/// the session driver recovers by re-prompting for that turn only.
pub fn parse_pin(raw: &str) -> Result<u32, Error> {
    let pin: u32 = raw
        .trim()
        .parse()
        .map_err(|_| Error::validation("PIN must be a 4-digit number"))?;
    if !(1000..=9999).contains(&pin) {
        return Err(Error::validation("PIN must be a 4-digit number"));
    }
    Ok(pin)
}

/// One account row in the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    /// The account's PIN.
    pub pin: u32,
    /// Current balance in dollars.
    pub balance: f64,
    /// Premium membership flag.
    pub premium: bool,
}

/// The domain record store contexts are validated against.
///
/// An authorization failure is not an error: tools gated on authorization
/// simply report unavailable.
pub trait RecordStore: Send + Sync {
    /// Check whether the context's credentials match a stored record.
    fn authorize(&self, context: &SessionContext) -> bool;

    /// Look up the record for a named account.
    fn record(&self, name: &str) -> Option<AccountRecord>;
}

/// Reference-counted record store handle.
pub type SharedRecordStore = Arc<dyn RecordStore>;

/// In-memory record store backing the demo personas.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    accounts: HashMap<String, AccountRecord>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account, replacing any existing record for the name.
    #[must_use]
    pub fn with_account(mut self, name: impl Into<String>, record: AccountRecord) -> Self {
        self.accounts.insert(name.into(), record);
        self
    }

    /// The demo bank database.
    #[must_use]
    pub fn demo_bank() -> Self {
        Self::new().with_account(
            "Basit ali",
            AccountRecord {
                pin: 1234,
                balance: 5000.0,
                premium: false,
            },
        )
    }
}

impl RecordStore for InMemoryRecordStore {
    fn authorize(&self, context: &SessionContext) -> bool {
        let Some(pin) = context.pin else {
            return false;
        };
        self.accounts
            .get(&context.name)
            .is_some_and(|record| record.pin == pin)
    }

    fn record(&self, name: &str) -> Option<AccountRecord> {
        self.accounts.get(name).cloned()
    }
}
