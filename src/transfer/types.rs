//! Transfer Core Types
//!
//! Type definitions shared by the submitter, dispatcher and orchestrator.

use std::fmt;

use serde::Serialize;

use super::account::CounterAccount;
use super::error::{LocationError, NotifyError, TransferError, ValidationError};
use super::location::GeoFix;
use super::state::OrchestratorState;

/// Attempt ID - ULID-based correlation id, one per submission attempt.
///
/// Only used to tie log lines of one attempt together; it is never sent to
/// the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(ulid::Ulid);

impl AttemptId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single transfer submission. Immutable; built fresh per attempt.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    attempt_id: AttemptId,
    user_id: String,
    source_account: String,
    counter_account: CounterAccount,
    amount_minor: u64,
    location: GeoFix,
}

impl TransferRequest {
    /// Build a request for submission.
    ///
    /// A zero amount or a fix flagged as spoofed can never be sent, whoever
    /// builds the request.
    pub fn new(
        attempt_id: AttemptId,
        user_id: String,
        source_account: String,
        counter_account: CounterAccount,
        amount_minor: u64,
        location: GeoFix,
    ) -> Result<Self, TransferError> {
        if amount_minor == 0 {
            return Err(ValidationError::EmptyAmount.into());
        }
        if location.suspected_spoofed {
            return Err(LocationError::Spoofed.into());
        }

        Ok(Self {
            attempt_id,
            user_id,
            source_account,
            counter_account,
            amount_minor,
            location,
        })
    }

    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn source_account(&self) -> &str {
        &self.source_account
    }

    pub fn counter_account(&self) -> &CounterAccount {
        &self.counter_account
    }

    pub fn amount_minor(&self) -> u64 {
        self.amount_minor
    }

    pub fn location(&self) -> GeoFix {
        self.location
    }
}

/// Wire body for `POST /transfer`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody<'a> {
    pub user_id: &'a str,
    pub source_account: &'a str,
    pub counter_account: &'a str,
    pub amount_minor: u64,
    pub used_card: u32,
    pub description: &'a str,
    pub location: [f64; 2],
}

/// Outcome of one transfer submission. Terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResult {
    Success {
        transaction_id: String,
    },
    /// Backend refused the transfer for risk/policy reasons
    FraudBlocked {
        reason: String,
    },
    /// `status_code` is `None` when no HTTP response was received
    Failed {
        status_code: Option<u16>,
        message: String,
    },
}

impl TransferResult {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, TransferResult::Success { .. })
    }

    #[inline]
    pub fn is_fraud_blocked(&self) -> bool {
        matches!(self, TransferResult::FraudBlocked { .. })
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, TransferResult::Failed { .. })
    }

    /// The transaction id of a successful transfer
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            TransferResult::Success { transaction_id } => Some(transaction_id),
            _ => None,
        }
    }
}

/// Wire body for `POST /notify`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub transaction_id: String,
    pub delivery_token: String,
    pub user_id: String,
}

/// Successful notification outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    /// A confirmation for this transaction id was already attempted
    AlreadySent,
}

/// What the user is told after a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transaction_id: String,
    pub amount_minor: u64,
    pub notification: Result<NotifyOutcome, NotifyError>,
}

impl TransferReceipt {
    /// Soft warning for a failed notification. The transfer stands.
    pub fn warning(&self) -> Option<String> {
        match &self.notification {
            Ok(_) => None,
            Err(e) => Some(format!(
                "Transfer completed, but the confirmation notification could not be sent ({})",
                e
            )),
        }
    }
}

/// Result of a submit tap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(TransferReceipt),
    /// Attempt ended early; `stage` is where it stopped
    Aborted {
        stage: OrchestratorState,
        error: TransferError,
    },
    /// Tap swallowed because a submission is in flight or cooling down
    Debounced,
}

impl SubmitOutcome {
    /// One user-facing line for this outcome, if any
    pub fn user_message(&self) -> Option<String> {
        match self {
            SubmitOutcome::Completed(receipt) => Some(format!(
                "Sent {} won.",
                super::amount::format_grouped(receipt.amount_minor)
            )),
            SubmitOutcome::Aborted { error, .. } => Some(error.user_message()),
            SubmitOutcome::Debounced => None,
        }
    }
}
