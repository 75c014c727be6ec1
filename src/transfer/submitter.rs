//! Transfer Submitter
//!
//! Sends one transfer to the ledger backend and classifies the response:
//!
//! 1. `403` → [`TransferResult::FraudBlocked`], whatever the body looks like
//! 2. other non-2xx → [`TransferResult::Failed`]
//! 3. 2xx → [`TransferResult::Success`] only if a transaction id can be
//!    extracted, otherwise `Failed`
//!
//! No retries happen here. Re-submission is an explicit user action.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{info, warn};

use super::account::mask;
use super::types::{TransferBody, TransferRequest, TransferResult};
use crate::config::{ConfigError, TransferApiConfig};

/// Reason used when a 403 carries no readable message
pub const DEFAULT_BLOCK_REASON: &str = "transfer blocked by fraud policy";

/// Transaction id locations, highest priority first.
///
/// The backend has shipped all of these at some point.
const TRANSACTION_ID_POINTERS: [&str; 4] = ["/transactionId", "/id", "/data/transactionId", "/data/id"];

/// Issues transfer requests against the backend transfer endpoint
pub struct TransferSubmitter {
    client: reqwest::Client,
    endpoint: String,
    used_card: u32,
    description: String,
}

impl TransferSubmitter {
    pub fn new(config: &TransferApiConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: join_url(&config.base_url, &config.transfer_path),
            used_card: config.used_card,
            description: config.description.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit without a bearer token
    pub async fn submit(&self, request: &TransferRequest) -> TransferResult {
        self.submit_authorized(request, None).await
    }

    /// Submit, attaching `Authorization: Bearer <id_token>` when given
    pub async fn submit_authorized(
        &self,
        request: &TransferRequest,
        id_token: Option<&str>,
    ) -> TransferResult {
        let location = request.location();
        let body = TransferBody {
            user_id: request.user_id(),
            source_account: request.source_account(),
            counter_account: request.counter_account().as_str(),
            amount_minor: request.amount_minor(),
            used_card: self.used_card,
            description: &self.description,
            location: [location.lat, location.lon],
        };

        info!(
            attempt_id = %request.attempt_id(),
            from = %mask(request.source_account()),
            to = %mask(request.counter_account().as_str()),
            amount = request.amount_minor(),
            "Submitting transfer"
        );

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = id_token {
            builder = builder.bearer_auth(token);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(attempt_id = %request.attempt_id(), error = %e, "Transfer request failed");
                return TransferResult::Failed {
                    status_code: None,
                    message: e.to_string(),
                };
            }
        };

        let status = response.status();
        // An unreadable body still has a meaningful status; classify on that.
        let payload = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
            Err(e) => {
                warn!(attempt_id = %request.attempt_id(), error = %e, "Failed to read transfer response body");
                None
            }
        };

        let result = interpret_response(status, payload.as_ref());
        match &result {
            TransferResult::Success { transaction_id } => info!(
                attempt_id = %request.attempt_id(),
                transaction_id = %transaction_id,
                "Transfer accepted"
            ),
            TransferResult::FraudBlocked { reason } => warn!(
                attempt_id = %request.attempt_id(),
                reason = %reason,
                "Transfer blocked by fraud check"
            ),
            TransferResult::Failed {
                status_code,
                message,
            } => warn!(
                attempt_id = %request.attempt_id(),
                status = ?status_code,
                message = %message,
                "Transfer failed"
            ),
        }
        result
    }
}

/// Classify a transfer response
pub fn interpret_response(status: StatusCode, body: Option<&Value>) -> TransferResult {
    if status == StatusCode::FORBIDDEN {
        let reason = body
            .and_then(message_of)
            .unwrap_or(DEFAULT_BLOCK_REASON)
            .to_string();
        return TransferResult::FraudBlocked { reason };
    }

    if !status.is_success() {
        let message = body
            .and_then(message_of)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return TransferResult::Failed {
            status_code: Some(status.as_u16()),
            message,
        };
    }

    match body.and_then(extract_transaction_id) {
        Some(transaction_id) => TransferResult::Success { transaction_id },
        None => TransferResult::Failed {
            status_code: Some(status.as_u16()),
            message: "response did not include a transaction id".to_string(),
        },
    }
}

/// Pull the transaction id out of a success body.
///
/// Keys are tried in [`TRANSACTION_ID_POINTERS`] order. String and integer
/// ids are accepted, empty strings are not. Any key other than the first is
/// logged so the backend inconsistency stays visible.
pub fn extract_transaction_id(body: &Value) -> Option<String> {
    for (rank, pointer) in TRANSACTION_ID_POINTERS.iter().enumerate() {
        let id = match body.pointer(pointer) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) if n.is_u64() || n.is_i64() => n.to_string(),
            _ => continue,
        };
        if rank > 0 {
            warn!(key = %pointer, "Transaction id found under fallback key");
        }
        return Some(id);
    }
    None
}

fn message_of(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
}

/// Join a base URL and a path without doubling or dropping the slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
