//! Transfer Orchestrator
//!
//! Drives one submission attempt through the state machine. Side effects are
//! strictly sequential: location before the transfer call, transaction id
//! before notification. The single-flight lock is held for the whole attempt
//! and for the cool-down after it.
//!
//! Each attempt runs on its own task. Dropping the future returned by
//! [`TransferOrchestrator::submit`] does not cancel it: a transfer that has
//! been sent is always followed by its notification step.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

use super::account::{CounterAccount, same_account};
use super::amount::AmountEntryValidator;
use super::error::{TransferError, ValidationError};
use super::location::{GeolocationProvider, LocationIntegrityGate};
use super::lock::SubmissionLock;
use super::notify::{DeliveryTokenStore, NotificationDispatcher};
use super::session::SessionProvider;
use super::state::OrchestratorState;
use super::submitter::TransferSubmitter;
use super::types::{AttemptId, SubmitOutcome, TransferReceipt, TransferRequest, TransferResult};
use crate::config::{AppConfig, ConfigError};

/// What the transfer screen holds when submit is tapped
#[derive(Debug, Clone)]
pub struct TransferForm {
    pub source_account: String,
    /// Raw counter account input, sanitized during validation
    pub counter_account: String,
    /// Entered amount digits
    pub amount: String,
    /// Latest known balance of the source account
    pub latest_balance: u64,
}

/// Validated inputs of one attempt
struct Validated {
    user_id: String,
    counter_account: CounterAccount,
    amount_minor: u64,
}

/// Transfer Orchestrator - one debounced, sequential operation per tap
pub struct TransferOrchestrator {
    validator: AmountEntryValidator,
    gate: LocationIntegrityGate,
    submitter: TransferSubmitter,
    dispatcher: NotificationDispatcher,
    session: Arc<dyn SessionProvider>,
    lock: Arc<SubmissionLock>,
    state: Mutex<OrchestratorState>,
}

impl TransferOrchestrator {
    pub fn new(
        validator: AmountEntryValidator,
        gate: LocationIntegrityGate,
        submitter: TransferSubmitter,
        dispatcher: NotificationDispatcher,
        session: Arc<dyn SessionProvider>,
        lock: SubmissionLock,
    ) -> Self {
        Self {
            validator,
            gate,
            submitter,
            dispatcher,
            session,
            lock: Arc::new(lock),
            state: Mutex::new(OrchestratorState::Idle),
        }
    }

    /// Wire up every component from application config
    pub fn from_config(
        config: &AppConfig,
        location: Arc<dyn GeolocationProvider>,
        session: Arc<dyn SessionProvider>,
        tokens: Arc<dyn DeliveryTokenStore>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            AmountEntryValidator::new(config.submission.max_amount_digits),
            LocationIntegrityGate::new(
                location,
                config.location.timeout(),
                config.location.max_age(),
            ),
            TransferSubmitter::new(&config.transfer_api)?,
            NotificationDispatcher::new(&config.notify_api, tokens)?,
            session,
            SubmissionLock::new(config.submission.cooldown()),
        ))
    }

    /// Keystroke validator for the amount pad
    pub fn validator(&self) -> &AmountEntryValidator {
        &self.validator
    }

    /// Current state for UI binding
    pub fn state(&self) -> OrchestratorState {
        if self.lock.is_cooling_down() {
            OrchestratorState::Cooldown
        } else if !self.lock.is_in_flight() {
            OrchestratorState::Idle
        } else {
            self.recorded_state()
        }
    }

    /// Whether the submit control should be disabled
    pub fn is_in_flight(&self) -> bool {
        self.lock.is_in_flight()
    }

    /// Handle a submit tap.
    ///
    /// Taps arriving while an attempt is in flight or cooling down are
    /// swallowed. The attempt itself runs on a spawned task that owns the
    /// lock guard, so it completes even if this future is dropped.
    pub async fn submit(self: &Arc<Self>, form: &TransferForm) -> SubmitOutcome {
        let Some(guard) = self.lock.try_acquire() else {
            debug!("Submit tap ignored, submission in flight");
            return SubmitOutcome::Debounced;
        };

        let attempt_id = AttemptId::new();
        // === Validating ===
        self.transition(attempt_id, OrchestratorState::Validating);

        let this = Arc::clone(self);
        let form = form.clone();
        let attempt = tokio::spawn(async move {
            let _guard = guard;
            let outcome = this.run_attempt(attempt_id, &form).await;
            this.transition(attempt_id, OrchestratorState::Cooldown);
            outcome
        });

        match attempt.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let stage = self.recorded_state();
                error!(
                    attempt_id = %attempt_id,
                    stage = %stage,
                    transfer_may_be_sent = stage.is_remote(),
                    error = %e,
                    "Transfer attempt task failed"
                );
                SubmitOutcome::Aborted {
                    stage,
                    error: TransferError::TransferFailed {
                        status_code: None,
                        message: format!("attempt task failed: {}", e),
                    },
                }
            }
        }
    }

    async fn run_attempt(&self, attempt_id: AttemptId, form: &TransferForm) -> SubmitOutcome {
        let validated = match self.validate(form).await {
            Ok(v) => v,
            Err(e) => return self.abort(attempt_id, OrchestratorState::Validating, e),
        };

        // === LocationCheck ===
        self.transition(attempt_id, OrchestratorState::LocationCheck);
        let fix = match self.gate.acquire_for_transfer().await {
            Ok(fix) => fix,
            Err(e) => return self.abort(attempt_id, OrchestratorState::LocationCheck, e.into()),
        };

        // === Submitting ===
        let request = match TransferRequest::new(
            attempt_id,
            validated.user_id,
            form.source_account.clone(),
            validated.counter_account,
            validated.amount_minor,
            fix,
        ) {
            Ok(request) => request,
            Err(e) => return self.abort(attempt_id, OrchestratorState::LocationCheck, e),
        };
        self.transition(attempt_id, OrchestratorState::Submitting);
        let id_token = self.session.id_token().await;
        let transaction_id = match self
            .submitter
            .submit_authorized(&request, id_token.as_deref())
            .await
        {
            TransferResult::Success { transaction_id } => transaction_id,
            TransferResult::FraudBlocked { reason } => {
                return self.abort(
                    attempt_id,
                    OrchestratorState::Submitting,
                    TransferError::FraudBlocked { reason },
                );
            }
            TransferResult::Failed {
                status_code,
                message,
            } => {
                return self.abort(
                    attempt_id,
                    OrchestratorState::Submitting,
                    TransferError::TransferFailed {
                        status_code,
                        message,
                    },
                );
            }
        };

        // === Notifying ===
        self.transition(attempt_id, OrchestratorState::Notifying);
        let notification = self
            .dispatcher
            .confirm_authorized(&transaction_id, request.user_id(), id_token.as_deref())
            .await;
        if let Err(e) = &notification {
            // Transfer stands; reconciliation of lost notifications is not
            // handled client-side.
            warn!(
                attempt_id = %attempt_id,
                transaction_id = %transaction_id,
                error = %e,
                "Notification failed after successful transfer"
            );
        }

        info!(
            attempt_id = %attempt_id,
            transaction_id = %transaction_id,
            amount = request.amount_minor(),
            "Transfer completed"
        );

        SubmitOutcome::Completed(TransferReceipt {
            transaction_id,
            amount_minor: request.amount_minor(),
            notification,
        })
    }

    /// Session, counter account and amount re-check. No network calls.
    async fn validate(&self, form: &TransferForm) -> Result<Validated, TransferError> {
        let user_id = self
            .session
            .current_user_id()
            .await
            .ok_or(TransferError::NoSession)?;

        let counter_account = CounterAccount::parse(&form.counter_account)?;
        if same_account(&form.source_account, &counter_account) {
            return Err(ValidationError::SameAccount.into());
        }

        let amount_minor = self
            .validator
            .revalidate(&form.amount, form.latest_balance)?;

        Ok(Validated {
            user_id,
            counter_account,
            amount_minor,
        })
    }

    fn abort(
        &self,
        attempt_id: AttemptId,
        stage: OrchestratorState,
        error: TransferError,
    ) -> SubmitOutcome {
        warn!(
            attempt_id = %attempt_id,
            stage = %stage,
            code = error.code(),
            error = %error,
            "Transfer attempt aborted"
        );
        SubmitOutcome::Aborted { stage, error }
    }

    fn recorded_state(&self) -> OrchestratorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, attempt_id: AttemptId, next: OrchestratorState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(attempt_id = %attempt_id, from = %*state, to = %next, "State transition");
        *state = next;
    }
}

impl std::fmt::Debug for TransferOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferOrchestrator")
            .field("state", &self.state())
            .field("endpoint", &self.submitter.endpoint())
            .finish()
    }
}
