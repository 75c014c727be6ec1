//! Submission Lock
//!
//! Single-flight flag owned by the orchestrator. Held for the whole attempt
//! and for a cool-down window after it, so duplicate taps are swallowed while
//! a backend side effect may still be propagating.
//!
//! The guard owns a handle to its lock, so it can move into the task that
//! runs the attempt and outlive the caller's future.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free,
    InFlight,
    CoolingDown { until: Instant },
}

/// Process-wide `in_flight` flag with a cool-down on release
#[derive(Debug)]
pub struct SubmissionLock {
    cooldown: Duration,
    slot: Mutex<Slot>,
}

impl SubmissionLock {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            slot: Mutex::new(Slot::Free),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Take the lock, or `None` while an attempt is in flight or cooling down.
    ///
    /// Dropping the guard starts the cool-down, including on panic.
    pub fn try_acquire(self: &Arc<Self>) -> Option<SubmissionGuard> {
        {
            let mut slot = self.slot();
            if Self::busy(&slot) {
                return None;
            }
            *slot = Slot::InFlight;
        }
        Some(SubmissionGuard {
            lock: Arc::clone(self),
        })
    }

    /// The `in_flight` flag: true from acquisition until the cool-down ends
    pub fn is_in_flight(&self) -> bool {
        Self::busy(&self.slot())
    }

    /// True only during the post-completion window
    pub fn is_cooling_down(&self) -> bool {
        matches!(*self.slot(), Slot::CoolingDown { until } if Instant::now() < until)
    }

    fn busy(slot: &Slot) -> bool {
        match *slot {
            Slot::Free => false,
            Slot::InFlight => true,
            Slot::CoolingDown { until } => Instant::now() < until,
        }
    }

    fn release(&self) {
        let until = Instant::now() + self.cooldown;
        *self.slot() = Slot::CoolingDown { until };
        debug!(
            cooldown_ms = self.cooldown.as_millis() as u64,
            "Submission released, cooling down"
        );
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        // The slot is plain data; a panic while holding it cannot leave it
        // half-written, so a poisoned lock is still usable.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// RAII guard for an in-flight submission
#[derive(Debug)]
pub struct SubmissionGuard {
    lock: Arc<SubmissionLock>,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}
