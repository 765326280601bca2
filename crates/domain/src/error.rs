//! Domain error types.

use common::PaymentId;
use thiserror::Error;

/// Errors returned by payment registry operations.
///
/// Illegal or redundant lifecycle events are not errors; they are reported
/// through [`TransitionOutcome`](crate::TransitionOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// No payment is registered under the id.
    #[error("Payment not found: {payment_id}")]
    NotFound { payment_id: PaymentId },

    /// A payment is already registered under the id.
    #[error("Payment already exists: {payment_id}")]
    AlreadyExists { payment_id: PaymentId },
}

/// Convenience type alias for payment results.
pub type Result<T> = std::result::Result<T, PaymentError>;
