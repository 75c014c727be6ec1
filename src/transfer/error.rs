//! Transfer Error Types
//!
//! Error taxonomy for the submission flow. Everything a deeper component
//! reports is folded into [`TransferError`] at the orchestrator boundary.

use thiserror::Error;

/// Local input errors. No network call has been made when one of these is
/// returned, and re-entering the input always recovers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Only digits are accepted: got '{0}'")]
    NotNumeric(String),

    #[error("Amount cannot exceed {max} digits")]
    TooLong { max: usize },

    #[error("Insufficient funds: balance {ceiling}, attempted {attempted}")]
    InsufficientFunds { ceiling: u64, attempted: u64 },

    #[error("Amount must be greater than zero")]
    EmptyAmount,

    #[error("Counter account is required")]
    MissingCounterAccount,

    #[error("Invalid account number '{0}' (expected 2-3, 2-6, 2-6 digit groups)")]
    InvalidAccountFormat(String),

    #[error("Source and counter account cannot be the same")]
    SameAccount,
}

/// Location gate failures. All of them abort the attempt before any
/// transfer request is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Location reported by a mock provider")]
    Spoofed,
}

/// Notification confirmation failures. Never fatal for the transfer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Delivery token unavailable")]
    TokenUnavailable,

    #[error("Notification rejected with HTTP {status}")]
    Rejected { status: u16 },

    #[error("Notification transport error: {0}")]
    Transport(String),
}

/// Orchestrator boundary error: one variant per abort path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("No active session")]
    NoSession,

    #[error("Location check failed: {0}")]
    Location(#[from] LocationError),

    #[error("Transfer blocked: {reason}")]
    FraudBlocked { reason: String },

    #[error("Transfer failed ({}): {message}", status_label(.status_code))]
    TransferFailed {
        status_code: Option<u16>,
        message: String,
    },
}

fn status_label(status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("HTTP {}", code),
        None => "no response".to_string(),
    }
}

impl TransferError {
    /// Stable error code for logs and UI bindings
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::Validation(ValidationError::InsufficientFunds { .. }) => {
                "INSUFFICIENT_FUNDS"
            }
            TransferError::Validation(ValidationError::SameAccount) => "SAME_ACCOUNT",
            TransferError::Validation(_) => "VALIDATION_ERROR",
            TransferError::NoSession => "NO_SESSION",
            TransferError::Location(LocationError::PermissionDenied) => {
                "LOCATION_PERMISSION_DENIED"
            }
            TransferError::Location(LocationError::Unavailable(_)) => "LOCATION_UNAVAILABLE",
            TransferError::Location(LocationError::Spoofed) => "LOCATION_SPOOFED",
            TransferError::FraudBlocked { .. } => "FRAUD_BLOCKED",
            TransferError::TransferFailed { .. } => "TRANSFER_FAILED",
        }
    }

    /// Whether the user may try again by re-tapping submit.
    ///
    /// A fraud block is terminal for the attempt; re-submitting the same
    /// transfer is a new attempt the backend will judge again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TransferError::FraudBlocked { .. })
    }

    /// The single message shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            TransferError::Validation(ValidationError::InsufficientFunds { .. }) => {
                "Insufficient balance.".to_string()
            }
            TransferError::Validation(ValidationError::EmptyAmount) => {
                "Enter an amount.".to_string()
            }
            TransferError::Validation(ValidationError::MissingCounterAccount) => {
                "Enter the recipient account number.".to_string()
            }
            TransferError::Validation(ValidationError::SameAccount) => {
                "You cannot send money to the same account.".to_string()
            }
            TransferError::Validation(e) => e.to_string(),
            TransferError::NoSession => "You are not signed in. Please log in again.".to_string(),
            TransferError::Location(LocationError::PermissionDenied) => {
                "Location permission is required to send money.".to_string()
            }
            TransferError::Location(LocationError::Spoofed) => {
                "Your location could not be verified. Disable mock location apps and retry."
                    .to_string()
            }
            TransferError::Location(LocationError::Unavailable(_)) => {
                "Could not determine your current location.".to_string()
            }
            // Block reasons may carry policy guidance, so they go out verbatim
            TransferError::FraudBlocked { reason } => reason.clone(),
            TransferError::TransferFailed { .. } => {
                "The transfer could not be completed. Please try again.".to_string()
            }
        }
    }
}
