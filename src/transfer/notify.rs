//! Notification Dispatcher
//!
//! Confirms a completed transfer to the push-notification backend. Runs only
//! after a successful transfer and never affects it: every failure here is a
//! soft warning.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::error::NotifyError;
use super::submitter::join_url;
use super::types::{NotificationPayload, NotifyOutcome};
use crate::config::{ConfigError, NotifyApiConfig};

/// Header carrying the transaction id so the backend can de-duplicate
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Delivery-token store, populated at login time by someone else
#[async_trait]
pub trait DeliveryTokenStore: Send + Sync {
    async fn get_token(&self) -> Option<String>;
}

/// Token store fixed at construction (CLI use, tests)
#[derive(Debug, Clone, Default)]
pub struct StaticTokenStore {
    token: Option<String>,
}

impl StaticTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl DeliveryTokenStore for StaticTokenStore {
    async fn get_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Sends at most one confirmation per transaction id
pub struct NotificationDispatcher {
    client: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn DeliveryTokenStore>,
    /// Transaction ids a confirmation was attempted for
    attempted: Mutex<HashSet<String>>,
}

impl NotificationDispatcher {
    pub fn new(
        config: &NotifyApiConfig,
        tokens: Arc<dyn DeliveryTokenStore>,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: join_url(&config.base_url, &config.notify_path),
            tokens,
            attempted: Mutex::new(HashSet::new()),
        })
    }

    pub async fn confirm(
        &self,
        transaction_id: &str,
        user_id: &str,
    ) -> Result<NotifyOutcome, NotifyError> {
        self.confirm_authorized(transaction_id, user_id, None).await
    }

    /// Confirm a successful transfer.
    ///
    /// Only call this with the id from a `TransferResult::Success`.
    pub async fn confirm_authorized(
        &self,
        transaction_id: &str,
        user_id: &str,
        id_token: Option<&str>,
    ) -> Result<NotifyOutcome, NotifyError> {
        if self.was_attempted(transaction_id) {
            debug!(transaction_id, "Notification already sent, skipping");
            return Ok(NotifyOutcome::AlreadySent);
        }

        let Some(delivery_token) = self.tokens.get_token().await else {
            warn!(transaction_id, "No delivery token, notification skipped");
            return Err(NotifyError::TokenUnavailable);
        };

        // Claim the id before sending: a timed-out request may still have
        // been delivered, so it is never sent twice.
        if !self.claim(transaction_id) {
            return Ok(NotifyOutcome::AlreadySent);
        }

        let payload = NotificationPayload {
            transaction_id: transaction_id.to_string(),
            delivery_token,
            user_id: user_id.to_string(),
        };

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(IDEMPOTENCY_HEADER, transaction_id)
            .json(&payload);
        if let Some(token) = id_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(transaction_id, error = %e, "Notification request failed");
            NotifyError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                transaction_id,
                status = status.as_u16(),
                "Notification rejected"
            );
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(transaction_id, "Transfer notification delivered");
        Ok(NotifyOutcome::Delivered)
    }

    fn was_attempted(&self, transaction_id: &str) -> bool {
        self.attempted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(transaction_id)
    }

    fn claim(&self, transaction_id: &str) -> bool {
        self.attempted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(transaction_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::testkit::StubBackend;

    fn dispatcher(base_url: &str, token: Option<&str>) -> NotificationDispatcher {
        NotificationDispatcher::new(
            &NotifyApiConfig {
                base_url: base_url.to_string(),
                ..NotifyApiConfig::default()
            },
            Arc::new(StaticTokenStore::new(token.map(str::to_string))),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_confirm_sends_payload() {
        let backend = StubBackend::start().await;
        let d = dispatcher(&backend.base_url, Some("fcm-token"));

        assert_eq!(
            d.confirm("tx-1", "user-1").await,
            Ok(NotifyOutcome::Delivered)
        );
        assert_eq!(backend.notify_calls(), 1);

        let body = backend.last_notify_body().unwrap();
        assert_eq!(
            body,
            serde_json::json!({"transactionId": "tx-1", "deliveryToken": "fcm-token", "userId": "user-1"})
        );
        assert_eq!(backend.last_idempotency_key().as_deref(), Some("tx-1"));
    }

    #[tokio::test]
    async fn test_confirm_at_most_once_per_transaction() {
        let backend = StubBackend::start().await;
        let d = dispatcher(&backend.base_url, Some("fcm-token"));

        d.confirm("tx-1", "user-1").await.unwrap();
        assert_eq!(
            d.confirm("tx-1", "user-1").await,
            Ok(NotifyOutcome::AlreadySent)
        );
        d.confirm("tx-2", "user-1").await.unwrap();
        assert_eq!(backend.notify_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_is_soft_failure() {
        let backend = StubBackend::start().await;
        let d = dispatcher(&backend.base_url, None);

        assert_eq!(
            d.confirm("tx-1", "user-1").await,
            Err(NotifyError::TokenUnavailable)
        );
        assert_eq!(backend.notify_calls(), 0);
    }

    #[tokio::test]
    async fn test_rejection_is_not_resent() {
        let backend = StubBackend::start().await;
        backend.respond_notify(500);
        let d = dispatcher(&backend.base_url, Some("fcm-token"));

        assert_eq!(
            d.confirm("tx-1", "user-1").await,
            Err(NotifyError::Rejected { status: 500 })
        );
        assert_eq!(
            d.confirm("tx-1", "user-1").await,
            Ok(NotifyOutcome::AlreadySent)
        );
        assert_eq!(backend.notify_calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_error() {
        let d = dispatcher("http://127.0.0.1:9", Some("fcm-token"));
        assert!(matches!(
            d.confirm("tx-1", "user-1").await,
            Err(NotifyError::Transport(_))
        ));
    }
}
