//! Per-payment lifecycle holder.

use chrono::{DateTime, Utc};

use super::{PaymentEvent, PaymentState, TransitionOutcome};

/// Owns the current [`PaymentState`] of a single payment.
///
/// The state is only ever replaced wholesale, and only by an accepted
/// transition. Rejected events leave the context untouched.
#[derive(Debug, Clone)]
pub struct PaymentContext {
    state: PaymentState,
    transitions: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentContext {
    /// Creates a context in the `Pending` state.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            state: PaymentState::Pending,
            transitions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> PaymentState {
        self.state
    }

    /// Number of accepted transitions since creation.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last accepted transition, or creation time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn process(&mut self) -> TransitionOutcome {
        self.handle(PaymentEvent::Process)
    }

    pub fn cancel(&mut self) -> TransitionOutcome {
        self.handle(PaymentEvent::Cancel)
    }

    pub fn complete(&mut self) -> TransitionOutcome {
        self.handle(PaymentEvent::Complete)
    }

    /// Dispatches `event` to the current state and installs the result.
    pub fn handle(&mut self, event: PaymentEvent) -> TransitionOutcome {
        let outcome = self.state.on_event(event);

        match outcome {
            TransitionOutcome::Accepted { from, to, .. } => {
                self.set_state(to);
                tracing::info!(%event, %from, %to, "{}", outcome.message());
            }
            TransitionOutcome::Rejected { state, reason, .. } => {
                tracing::info!(%event, %state, ?reason, "{}", outcome.message());
            }
        }

        metrics::counter!(
            "payment_transitions_total",
            "event" => event.as_str(),
            "outcome" => outcome.label()
        )
        .increment(1);

        outcome
    }

    fn set_state(&mut self, state: PaymentState) {
        self.state = state;
        self.transitions += 1;
        self.updated_at = Utc::now();
    }
}

impl Default for PaymentContext {
    fn default() -> Self {
        Self::new()
    }
}
