//! Session driver: credential handling and per-turn context construction.
//!
//! The driver sits between a front end (a REPL, a service handler) and
//! the [`TurnPipeline`]. Each turn it validates the supplied credentials
//! into a fresh [`SessionContext`], runs the pipeline, and yields one
//! displayable outcome. Credential *format* problems (a malformed PIN)
//! are validation errors the caller re-prompts on; *wrong* credentials
//! are not errors at all — the turn proceeds and gated tools simply stay
//! disabled.

use tracing::debug;

use crate::agent::{TurnPipeline, TurnResult};
use crate::context::{SessionContext, SharedRecordStore, parse_pin};
use crate::error::Result;

/// Raw credentials as collected from the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// The user's name.
    pub name: String,
    /// PIN as typed, unparsed.
    pub pin: Option<String>,
    /// Library membership id, if any.
    pub member_id: Option<String>,
    /// Declared support issue category, if any.
    pub issue_category: Option<String>,
}

impl Credentials {
    /// Credentials carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pin: None,
            member_id: None,
            issue_category: None,
        }
    }

    /// Attach a raw PIN string.
    #[must_use]
    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    /// Attach a membership id.
    #[must_use]
    pub fn with_member_id(mut self, member_id: impl Into<String>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    /// Attach an issue category.
    #[must_use]
    pub fn with_issue_category(mut self, category: impl Into<String>) -> Self {
        self.issue_category = Some(category.into());
        self
    }
}

/// Drives turns for one agent pipeline, building a fresh context per
/// turn from the credentials supplied with it.
pub struct SessionDriver {
    pipeline: TurnPipeline,
    store: Option<SharedRecordStore>,
}

impl SessionDriver {
    /// Create a driver over the given pipeline.
    #[must_use]
    pub fn new(pipeline: TurnPipeline) -> Self {
        Self {
            pipeline,
            store: None,
        }
    }

    /// Attach the record store backing this session's account lookups.
    #[must_use]
    pub fn with_store(mut self, store: SharedRecordStore) -> Self {
        self.store = Some(store);
        self
    }

    /// The pipeline this driver runs.
    #[must_use]
    pub fn pipeline(&self) -> &TurnPipeline {
        &self.pipeline
    }

    /// Validate credentials into a session context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::error::Error::Validation)
    /// when the name is empty or the PIN is not a four-digit number. A
    /// well-formed PIN that does not match any account is accepted;
    /// authorization is decided per tool call, not here.
    pub fn build_context(&self, credentials: &Credentials) -> Result<SessionContext> {
        let name = credentials.name.trim();
        if name.is_empty() {
            return Err(crate::error::Error::validation("name must not be empty"));
        }

        let mut context = SessionContext::new(name);
        if let Some(ref raw) = credentials.pin {
            context = context.with_pin(parse_pin(raw)?);
        }
        if let Some(ref member_id) = credentials.member_id {
            context = context.with_member_id(member_id.clone());
        }
        if let Some(ref category) = credentials.issue_category {
            context = context.with_issue_category(category.clone());
        }

        // Membership tier comes from the account record, but only once
        // the session is authorized for it.
        if let Some(ref store) = self.store {
            let authorized = store.authorize(&context);
            if authorized {
                if let Some(record) = store.record(&context.name) {
                    context = context.with_premium(record.premium);
                }
            }
            debug!(user = %context.name, authorized, "session context built");
        }
        Ok(context)
    }

    /// Run one turn for the given credentials.
    ///
    /// # Errors
    ///
    /// Propagates validation errors from [`Self::build_context`] and any
    /// pipeline error.
    pub async fn run_turn(&self, credentials: &Credentials, input: &str) -> Result<TurnResult> {
        let context = self.build_context(credentials)?;
        self.pipeline.run_turn(&context, input).await
    }

    /// Run one turn and reduce it to the single line to display.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run_turn`].
    pub async fn display_turn(&self, credentials: &Credentials, input: &str) -> Result<String> {
        let result = self.run_turn(credentials, input).await?;
        Ok(result.display_text())
    }
}

impl std::fmt::Debug for SessionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDriver")
            .field("pipeline", &self.pipeline)
            .field("store", &self.store.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::agent::{Agent, TurnStatus};
    use crate::context::InMemoryRecordStore;
    use crate::error::{Error, InferenceError};
    use crate::inference::{InferenceRequest, InferenceResponse, InferenceService};

    use super::*;

    struct EchoService;

    #[async_trait]
    impl InferenceService for EchoService {
        async fn complete(
            &self,
            request: &InferenceRequest,
        ) -> std::result::Result<InferenceResponse, InferenceError> {
            Ok(InferenceResponse::from_text(format!("echo: {}", request.input)))
        }
    }

    fn driver() -> SessionDriver {
        let agent = Agent::new("echo", Arc::new(EchoService));
        SessionDriver::new(TurnPipeline::new(agent))
            .with_store(Arc::new(InMemoryRecordStore::demo_bank()))
    }

    #[test]
    fn test_build_context_validates_pin_format() {
        let driver = driver();

        let err = driver
            .build_context(&Credentials::named("Basit ali").with_pin("12ab"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let ctx = driver
            .build_context(&Credentials::named("Basit ali").with_pin("1234"))
            .unwrap();
        assert_eq!(ctx.pin, Some(1234));
    }

    #[test]
    fn test_wrong_pin_is_accepted_not_rejected() {
        let driver = driver();
        let ctx = driver
            .build_context(&Credentials::named("Basit ali").with_pin("9999"))
            .unwrap();
        assert_eq!(ctx.pin, Some(9999));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let driver = driver();
        let err = driver.build_context(&Credentials::named("   ")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_premium_tier_requires_authorization() {
        use crate::context::AccountRecord;

        let store = InMemoryRecordStore::new().with_account(
            "Vera",
            AccountRecord {
                pin: 4321,
                balance: 100.0,
                premium: true,
            },
        );
        let agent = Agent::new("echo", Arc::new(EchoService));
        let driver =
            SessionDriver::new(TurnPipeline::new(agent)).with_store(Arc::new(store));

        let authorized = driver
            .build_context(&Credentials::named("Vera").with_pin("4321"))
            .unwrap();
        assert!(authorized.premium);

        let unauthorized = driver
            .build_context(&Credentials::named("Vera").with_pin("1111"))
            .unwrap();
        assert!(!unauthorized.premium);
    }

    #[tokio::test]
    async fn test_run_turn_builds_fresh_context() {
        let driver = driver();
        let result = driver
            .run_turn(&Credentials::named("Basit ali").with_pin("1234"), "hello")
            .await
            .unwrap();
        assert_eq!(result.status, TurnStatus::Final);
        assert_eq!(result.answer.as_deref(), Some("echo: hello"));
    }

    #[tokio::test]
    async fn test_display_turn_returns_answer_text() {
        let driver = driver();
        let text = driver
            .display_turn(&Credentials::named("pat"), "hi")
            .await
            .unwrap();
        assert_eq!(text, "echo: hi");
    }
}
