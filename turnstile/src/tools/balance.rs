//! Account balance lookup, gated on verified credentials.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::context::{SessionContext, SharedRecordStore};
use crate::error::ToolError;
use crate::tool::{Tool, ToolDefinition};

/// Arguments for a balance lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckBalanceArgs {
    /// The account holder's name.
    pub account_holder: String,
}

/// Tool reporting the balance of the authenticated account holder.
///
/// Enabled only when the record store authorizes the session, i.e. the
/// context carries the account holder's correct PIN. An unauthenticated
/// session never sees this tool in its tool list.
#[derive(Clone)]
pub struct CheckBalance {
    store: SharedRecordStore,
}

impl CheckBalance {
    /// Create a balance tool backed by the given record store.
    #[must_use]
    pub fn new(store: SharedRecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CheckBalance {
    fn name(&self) -> &str {
        "check_balance"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "check_balance",
            "Look up the current account balance for an account holder.",
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "account_holder": {
                    "type": "string",
                    "description": "Full name of the account holder"
                }
            },
            "required": ["account_holder"]
        }))
    }

    fn enabled(&self, context: &SessionContext) -> bool {
        self.store.authorize(context)
    }

    async fn call(&self, context: &SessionContext, args: Value) -> Result<String, ToolError> {
        let args: CheckBalanceArgs = serde_json::from_value(args)?;
        // The model supplies the name argument, but the balance reported
        // is always the authenticated session's own account.
        let record = self.store.record(&context.name).ok_or_else(|| {
            ToolError::Execution(format!("no account on record for {}", context.name))
        })?;
        tracing::debug!(user = %context.name, requested = %args.account_holder, "balance lookup");
        Ok(format!(
            "The balance for {} is ${:.2}",
            context.name, record.balance
        ))
    }
}

impl std::fmt::Debug for CheckBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckBalance").finish_non_exhaustive()
    }
}
