//! Orchestrator State Definitions
//!
//! ```text
//! Idle → Validating → LocationCheck → Submitting → Notifying → Cooldown → Idle
//!            ↓              ↓              ↓
//!          Idle           Idle      Idle (+cooldown)
//! ```

use std::fmt;

/// Submission flow states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrchestratorState {
    /// Ready for a submit tap
    Idle,

    /// Re-checking session, counter account and amount (local only)
    Validating,

    /// Waiting for a trusted location fix
    LocationCheck,

    /// Transfer request sent; runs to completion once entered
    Submitting,

    /// Transfer succeeded; confirming to the notification backend
    Notifying,

    /// Attempt finished; submit stays disabled until the window elapses
    Cooldown,
}

impl OrchestratorState {
    /// States in which the attempt has reached the network
    #[inline]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            OrchestratorState::Submitting | OrchestratorState::Notifying
        )
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestratorState::Idle => "IDLE",
            OrchestratorState::Validating => "VALIDATING",
            OrchestratorState::LocationCheck => "LOCATION_CHECK",
            OrchestratorState::Submitting => "SUBMITTING",
            OrchestratorState::Notifying => "NOTIFYING",
            OrchestratorState::Cooldown => "COOLDOWN",
        }
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
