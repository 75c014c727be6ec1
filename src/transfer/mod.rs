//! Funds Transfer Submission
//!
//! Client-side flow for sending money from a user's account: amount entry,
//! location integrity check, transfer call, push-notification confirmation.
//!
//! # State Machine
//!
//! ```text
//! IDLE → VALIDATING → LOCATION_CHECK → SUBMITTING → NOTIFYING → COOLDOWN → IDLE
//!            ↓              ↓               ↓
//!         aborted        aborted         aborted ──────────────→ COOLDOWN
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Single Flight**: at most one attempt runs per orchestrator; extra taps are swallowed
//! 2. **Location First**: no transfer call without a non-spoofed fix
//! 3. **Id Before Notify**: notification only after a transaction id is extracted
//! 4. **At Most Once**: one notification attempt per transaction id
//! 5. **Fraud Is Final**: a fraud block is never retried automatically
//! 6. **No Cancellation**: an attempt runs on its own task; dropping the caller's future does not stop it

pub mod account;
pub mod amount;
pub mod coordinator;
pub mod error;
pub mod location;
pub mod lock;
pub mod notify;
pub mod session;
pub mod state;
pub mod submitter;
pub mod types;

#[cfg(test)]
mod testkit;

// Re-exports for convenience
pub use account::CounterAccount;
pub use amount::AmountEntryValidator;
pub use coordinator::{TransferForm, TransferOrchestrator};
pub use error::{LocationError, NotifyError, TransferError, ValidationError};
pub use location::{FixedLocationProvider, GeoFix, GeolocationProvider, LocationIntegrityGate};
pub use notify::{DeliveryTokenStore, NotificationDispatcher, StaticTokenStore};
pub use session::{SessionProvider, StaticSession};
pub use state::OrchestratorState;
pub use submitter::TransferSubmitter;
pub use types::{SubmitOutcome, TransferReceipt, TransferRequest, TransferResult};
