//! Payment state machine.

use serde::{Deserialize, Serialize};

/// The state of a payment in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Processing ──► Completed
///    │            │
///    └────────────┴──► Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentState {
    /// Payment has been created and awaits processing.
    #[default]
    Pending,

    /// Payment is being processed.
    Processing,

    /// Payment was canceled (terminal state).
    Canceled,

    /// Payment was completed (terminal state).
    Completed,
}

/// A lifecycle event dispatched to the current payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEvent {
    Process,
    Cancel,
    Complete,
}

/// Why an event left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The payment is already where the event would take it.
    AlreadyInState,

    /// The event is not allowed from the current state.
    IllegalFromState,
}

/// Result of dispatching a [`PaymentEvent`] to a [`PaymentState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The state changed from `from` to `to`.
    Accepted {
        event: PaymentEvent,
        from: PaymentState,
        to: PaymentState,
    },

    /// The event was a no-op; `state` is unchanged.
    Rejected {
        event: PaymentEvent,
        state: PaymentState,
        reason: Rejection,
    },
}

impl PaymentState {
    /// Every state, in lifecycle order.
    pub const ALL: [PaymentState; 4] = [
        PaymentState::Pending,
        PaymentState::Processing,
        PaymentState::Canceled,
        PaymentState::Completed,
    ];

    /// Computes the outcome of `event` in this state.
    ///
    /// Pure: the caller decides whether to install the new state.
    pub fn on_event(self, event: PaymentEvent) -> TransitionOutcome {
        use PaymentEvent::*;
        use PaymentState::*;

        let accept = |to| TransitionOutcome::Accepted {
            event,
            from: self,
            to,
        };
        let reject = |reason| TransitionOutcome::Rejected {
            event,
            state: self,
            reason,
        };

        match (self, event) {
            (Pending, Process) => accept(Processing),
            (Pending, Cancel) => accept(Canceled),
            (Pending, Complete) => reject(Rejection::IllegalFromState),

            (Processing, Process) => reject(Rejection::AlreadyInState),
            (Processing, Cancel) => accept(Canceled),
            (Processing, Complete) => accept(Completed),

            (Canceled, Process) => reject(Rejection::IllegalFromState),
            (Canceled, Cancel) => reject(Rejection::AlreadyInState),
            (Canceled, Complete) => reject(Rejection::IllegalFromState),

            (Completed, Process) => reject(Rejection::AlreadyInState),
            (Completed, Cancel) => reject(Rejection::IllegalFromState),
            (Completed, Complete) => reject(Rejection::AlreadyInState),
        }
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentState::Canceled | PaymentState::Completed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "Pending",
            PaymentState::Processing => "Processing",
            PaymentState::Canceled => "Canceled",
            PaymentState::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PaymentEvent {
    /// Every event.
    pub const ALL: [PaymentEvent; 3] = [
        PaymentEvent::Process,
        PaymentEvent::Cancel,
        PaymentEvent::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentEvent::Process => "process",
            PaymentEvent::Cancel => "cancel",
            PaymentEvent::Complete => "complete",
        }
    }
}

impl std::fmt::Display for PaymentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TransitionOutcome {
    /// Returns true if the state changed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, TransitionOutcome::Accepted { .. })
    }

    /// The event that produced this outcome.
    pub fn event(&self) -> PaymentEvent {
        match self {
            TransitionOutcome::Accepted { event, .. } | TransitionOutcome::Rejected { event, .. } => {
                *event
            }
        }
    }

    /// The state after the event was handled.
    pub fn resulting_state(&self) -> PaymentState {
        match self {
            TransitionOutcome::Accepted { to, .. } => *to,
            TransitionOutcome::Rejected { state, .. } => *state,
        }
    }

    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            TransitionOutcome::Accepted { .. } => "accepted",
            TransitionOutcome::Rejected {
                reason: Rejection::AlreadyInState,
                ..
            } => "already_in_state",
            TransitionOutcome::Rejected {
                reason: Rejection::IllegalFromState,
                ..
            } => "illegal",
        }
    }

    /// Human-readable description of what happened.
    pub fn message(&self) -> &'static str {
        use PaymentEvent::*;
        use PaymentState::*;

        match self {
            TransitionOutcome::Accepted { event, from, .. } => match (*from, *event) {
                (Pending, Process) => "Payment is being processed",
                (Pending, Cancel) => "Pending payment was canceled",
                (Processing, Cancel) => "Canceling payment in processing",
                (Processing, Complete) => "Payment processed successfully",
                _ => "Payment state changed",
            },
            TransitionOutcome::Rejected { event, state, .. } => match (*state, *event) {
                (Pending, Complete) => "Cannot complete a pending payment",
                (Processing, Process) => "Payment is already being processed",
                (Canceled, Process) => "Cannot process a canceled payment",
                (Canceled, Cancel) => "Payment was already canceled",
                (Canceled, Complete) => "Cannot complete a canceled payment",
                (Completed, Process) => "Payment was already completed",
                (Completed, Cancel) => "Completed payment cannot be canceled",
                (Completed, Complete) => "Payment is already completed",
                _ => "Payment state unchanged",
            },
        }
    }
}

impl std::fmt::Display for TransitionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionOutcome::Accepted { .. } => write!(f, "{}", self.message()),
            TransitionOutcome::Rejected { state, reason, .. } => {
                let reason = match reason {
                    Rejection::AlreadyInState => "already in state",
                    Rejection::IllegalFromState => "illegal from state",
                };
                write!(f, "{} ({reason} {state})", self.message())
            }
        }
    }
}
