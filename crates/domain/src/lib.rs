//! Domain layer for the payment lifecycle service.
//!
//! This crate provides:
//! - `PaymentState`, a closed state machine over Pending, Processing,
//!   Canceled and Completed
//! - `PaymentContext`, which owns the current state of one payment
//! - `PaymentRegistry`, which maps payment ids to their contexts

pub mod error;
pub mod payment;

pub use common::PaymentId;
pub use error::PaymentError;
pub use payment::{
    CreatePolicy, InvalidCreatePolicy, PaymentContext, PaymentEvent, PaymentRegistry,
    PaymentSnapshot, PaymentState, Rejection, TransitionOutcome,
};
