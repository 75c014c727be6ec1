//! Session capability
//!
//! The identity SDK's callback-style session lookup is hidden behind a single
//! async capability. The orchestrator only ever asks "who is signed in".

use async_trait::async_trait;

/// Credential/session provider
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session's user id, or `None` when nobody is signed in
    async fn current_user_id(&self) -> Option<String>;

    /// Bearer token for backend calls, if the provider issues one
    async fn id_token(&self) -> Option<String> {
        None
    }
}

/// Session fixed at construction (CLI use, tests)
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user_id: Option<String>,
    id_token: Option<String>,
}

impl StaticSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            id_token: None,
        }
    }

    /// A provider with nobody signed in
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    async fn id_token(&self) -> Option<String> {
        self.id_token.clone()
    }
}
