//! Shared types for the payment lifecycle service.

mod types;

pub use types::PaymentId;
