//! Registry mapping payment ids to their lifecycle contexts.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use common::PaymentId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{PaymentContext, PaymentEvent, PaymentState, TransitionOutcome};
use crate::error::{PaymentError, Result};

/// What `create` does when the id is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatePolicy {
    /// Replace the existing payment with a fresh `Pending` one.
    #[default]
    Overwrite,

    /// Refuse with [`PaymentError::AlreadyExists`].
    Reject,
}

#[derive(Debug, Error)]
#[error("unknown duplicate-create policy '{0}' (expected 'overwrite' or 'reject')")]
pub struct InvalidCreatePolicy(String);

impl FromStr for CreatePolicy {
    type Err = InvalidCreatePolicy;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(CreatePolicy::Overwrite),
            "reject" => Ok(CreatePolicy::Reject),
            other => Err(InvalidCreatePolicy(other.to_string())),
        }
    }
}

/// Point-in-time copy of a registered payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub payment_id: PaymentId,
    pub state: PaymentState,
    pub transitions: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentSnapshot {
    fn capture(payment_id: PaymentId, ctx: &PaymentContext) -> Self {
        Self {
            payment_id,
            state: ctx.state(),
            transitions: ctx.transitions(),
            created_at: ctx.created_at(),
            updated_at: ctx.updated_at(),
        }
    }
}

type Entry = Arc<Mutex<PaymentContext>>;

/// In-memory registry of payment lifecycles.
///
/// The map itself sits behind a read-write lock, and every context has its
/// own mutex: events for one payment are serialized while different
/// payments proceed independently.
#[derive(Debug, Default)]
pub struct PaymentRegistry {
    payments: RwLock<HashMap<PaymentId, Entry>>,
    policy: CreatePolicy,
}

impl PaymentRegistry {
    /// Creates an empty registry with the default (overwrite) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given duplicate-create policy.
    pub fn with_policy(policy: CreatePolicy) -> Self {
        Self {
            payments: RwLock::default(),
            policy,
        }
    }

    pub fn policy(&self) -> CreatePolicy {
        self.policy
    }

    /// Registers a new payment in the `Pending` state.
    ///
    /// Under [`CreatePolicy::Overwrite`] an existing payment with the same id
    /// is replaced and its lifecycle starts over.
    #[tracing::instrument(skip(self))]
    pub fn create(&self, payment_id: &str) -> Result<PaymentSnapshot> {
        let payment_id = PaymentId::from(payment_id);
        let ctx = PaymentContext::new();
        let snapshot = PaymentSnapshot::capture(payment_id.clone(), &ctx);

        let mut payments = self.payments.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = payments.contains_key(&payment_id);
        if replaced && self.policy == CreatePolicy::Reject {
            tracing::info!(%payment_id, "rejecting duplicate payment");
            return Err(PaymentError::AlreadyExists { payment_id });
        }
        payments.insert(payment_id.clone(), Arc::new(Mutex::new(ctx)));
        drop(payments);

        metrics::counter!("payments_created_total").increment(1);
        if replaced {
            tracing::info!(%payment_id, "payment recreated, lifecycle reset to Pending");
        } else {
            tracing::info!(%payment_id, "payment created");
        }

        Ok(snapshot)
    }

    pub fn process(&self, payment_id: &str) -> Result<TransitionOutcome> {
        self.dispatch(payment_id, PaymentEvent::Process)
    }

    pub fn cancel(&self, payment_id: &str) -> Result<TransitionOutcome> {
        self.dispatch(payment_id, PaymentEvent::Cancel)
    }

    pub fn complete(&self, payment_id: &str) -> Result<TransitionOutcome> {
        self.dispatch(payment_id, PaymentEvent::Complete)
    }

    /// Sends `event` to the payment registered under `payment_id`.
    #[tracing::instrument(skip(self))]
    pub fn dispatch(&self, payment_id: &str, event: PaymentEvent) -> Result<TransitionOutcome> {
        let entry = self.entry(payment_id)?;
        let outcome = lock(&entry).handle(event);
        Ok(outcome)
    }

    /// Returns a snapshot of the payment registered under `payment_id`.
    pub fn get(&self, payment_id: &str) -> Result<PaymentSnapshot> {
        let entry = self.entry(payment_id)?;
        let ctx = lock(&entry);
        Ok(PaymentSnapshot::capture(PaymentId::from(payment_id), &ctx))
    }

    /// Returns the current state of the payment.
    pub fn state(&self, payment_id: &str) -> Result<PaymentState> {
        let entry = self.entry(payment_id)?;
        let state = lock(&entry).state();
        Ok(state)
    }

    /// Returns snapshots of every payment, ordered by id.
    pub fn list(&self) -> Vec<PaymentSnapshot> {
        let payments = self.payments.read().unwrap_or_else(PoisonError::into_inner);
        let mut snapshots: Vec<PaymentSnapshot> = payments
            .iter()
            .map(|(id, entry)| PaymentSnapshot::capture(id.clone(), &lock(entry)))
            .collect();
        snapshots.sort_by(|a, b| a.payment_id.cmp(&b.payment_id));
        snapshots
    }

    /// Returns all registered ids, sorted.
    pub fn ids(&self) -> Vec<PaymentId> {
        let payments = self.payments.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<PaymentId> = payments.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, payment_id: &str) -> bool {
        self.payments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(payment_id)
    }

    pub fn len(&self) -> usize {
        self.payments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clones the entry handle so the map lock is released before the
    /// per-payment lock is taken.
    fn entry(&self, payment_id: &str) -> Result<Entry> {
        let payments = self.payments.read().unwrap_or_else(PoisonError::into_inner);
        match payments.get(payment_id) {
            Some(entry) => Ok(Arc::clone(entry)),
            None => {
                metrics::counter!("payment_not_found_total").increment(1);
                tracing::debug!(%payment_id, "payment not found");
                Err(PaymentError::NotFound {
                    payment_id: PaymentId::from(payment_id),
                })
            }
        }
    }
}

// A poisoned context still holds a valid state; keep serving it.
fn lock(entry: &Entry) -> MutexGuard<'_, PaymentContext> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}
