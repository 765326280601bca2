//! Payment lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{PaymentEvent, PaymentRegistry, PaymentSnapshot, PaymentState};
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub registry: PaymentRegistry,
}

// -- Response types --

#[derive(Serialize)]
pub struct PaymentCreatedResponse {
    pub payment_id: String,
    pub message: String,
    pub state: PaymentState,
}

#[derive(Serialize)]
pub struct TransitionResponse {
    pub payment_id: String,
    pub message: String,
    pub state: PaymentState,
    pub accepted: bool,
    pub outcome: &'static str,
    pub detail: String,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub payment_id: String,
    pub state: PaymentState,
    pub terminal: bool,
    pub transitions: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PaymentSnapshot> for PaymentResponse {
    fn from(snapshot: PaymentSnapshot) -> Self {
        Self {
            payment_id: snapshot.payment_id.into_inner(),
            state: snapshot.state,
            terminal: snapshot.state.is_terminal(),
            transitions: snapshot.transitions,
            created_at: snapshot.created_at.to_rfc3339(),
            updated_at: snapshot.updated_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /state/payments/:id/create — register a payment in the Pending state.
#[tracing::instrument(skip(state))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PaymentCreatedResponse>, ApiError> {
    validate_id(&id)?;
    let snapshot = state.registry.create(&id)?;

    Ok(Json(PaymentCreatedResponse {
        message: format!("Payment created with ID: {id}"),
        payment_id: id,
        state: snapshot.state,
    }))
}

/// POST /state/payments/:id/process
#[tracing::instrument(skip(state))]
pub async fn process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    transition(&state, id, PaymentEvent::Process)
}

/// POST /state/payments/:id/cancel
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    transition(&state, id, PaymentEvent::Cancel)
}

/// POST /state/payments/:id/complete
#[tracing::instrument(skip(state))]
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    transition(&state, id, PaymentEvent::Complete)
}

/// GET /state/payments/:id — current lifecycle snapshot of a payment.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let snapshot = state.registry.get(&id)?;
    Ok(Json(snapshot.into()))
}

/// GET /state/payments — all registered payments, ordered by id.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<PaymentResponse>> {
    Json(state.registry.list().into_iter().map(Into::into).collect())
}

/// Rejected events are still successful requests; the outcome is reported
/// in the body.
fn transition(
    state: &AppState,
    id: String,
    event: PaymentEvent,
) -> Result<Json<TransitionResponse>, ApiError> {
    let outcome = state.registry.dispatch(&id, event)?;

    Ok(Json(TransitionResponse {
        payment_id: id,
        message: done_message(event).to_string(),
        state: outcome.resulting_state(),
        accepted: outcome.is_accepted(),
        outcome: outcome.label(),
        detail: outcome.to_string(),
    }))
}

fn done_message(event: PaymentEvent) -> &'static str {
    match event {
        PaymentEvent::Process => "Payment processed.",
        PaymentEvent::Cancel => "Payment canceled.",
        PaymentEvent::Complete => "Payment completed.",
    }
}

fn validate_id(id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("Payment id must not be blank".to_string()));
    }
    Ok(())
}
