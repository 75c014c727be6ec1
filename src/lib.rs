//! Finguard - funds transfer submission client
//!
//! Takes a transfer from amount entry to a confirmed push notification,
//! with a location integrity check in between.
//!
//! # Modules
//!
//! - [`config`] - YAML application config
//! - [`logging`] - tracing subscriber setup
//! - [`transfer`] - amount entry, location gate, submitter, notification, orchestrator

pub mod config;
pub mod logging;
pub mod transfer;

// Convenient re-exports at crate root
pub use config::{AppConfig, ConfigError};
pub use transfer::{
    AmountEntryValidator, LocationIntegrityGate, NotificationDispatcher, OrchestratorState,
    SubmitOutcome, TransferError, TransferForm, TransferOrchestrator, TransferResult,
    TransferSubmitter,
};
