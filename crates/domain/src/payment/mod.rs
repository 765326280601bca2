//! Payment lifecycle: state machine, per-payment context and registry.

mod context;
mod registry;
mod state;

pub use context::PaymentContext;
pub use registry::{CreatePolicy, InvalidCreatePolicy, PaymentRegistry, PaymentSnapshot};
pub use state::{PaymentEvent, PaymentState, Rejection, TransitionOutcome};
