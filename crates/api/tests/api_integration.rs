//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use api::config::Config;
use domain::CreatePolicy;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    setup_with_policy(CreatePolicy::Overwrite)
}

fn setup_with_policy(create_policy: CreatePolicy) -> axum::Router {
    let config = Config {
        create_policy,
        ..Config::default()
    };
    api::create_app(api::create_state(&config), get_metrics_handle())
}

async fn post(app: &axum::Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(app: &axum::Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["payments"], 0);
}

#[tokio::test]
async fn test_create_payment() {
    let app = setup();

    let response = post(&app, "/state/payments/P1/create").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["payment_id"], "P1");
    assert_eq!(json["message"], "Payment created with ID: P1");
    assert_eq!(json["state"], "Pending");
}

#[tokio::test]
async fn test_process_then_complete() {
    let app = setup();
    post(&app, "/state/payments/P1/create").await;

    let processed = json_body(post(&app, "/state/payments/P1/process").await).await;
    assert_eq!(processed["message"], "Payment processed.");
    assert_eq!(processed["accepted"], true);
    assert_eq!(processed["state"], "Processing");

    let completed = json_body(post(&app, "/state/payments/P1/complete").await).await;
    assert_eq!(completed["message"], "Payment completed.");
    assert_eq!(completed["accepted"], true);
    assert_eq!(completed["state"], "Completed");

    let snapshot = json_body(get(&app, "/state/payments/P1").await).await;
    assert_eq!(snapshot["state"], "Completed");
    assert_eq!(snapshot["terminal"], true);
    assert_eq!(snapshot["transitions"], 2);
}

#[tokio::test]
async fn test_rejected_transition_is_still_ok() {
    let app = setup();
    post(&app, "/state/payments/P2/create").await;
    post(&app, "/state/payments/P2/cancel").await;

    let response = post(&app, "/state/payments/P2/process").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["accepted"], false);
    assert_eq!(json["outcome"], "illegal");
    assert_eq!(json["state"], "Canceled");
    assert_eq!(
        json["detail"],
        "Cannot process a canceled payment (illegal from state Canceled)"
    );
}

#[tokio::test]
async fn test_unknown_payment_returns_404() {
    let app = setup();

    for action in ["process", "cancel", "complete"] {
        let response = post(&app, &format!("/state/payments/UNKNOWN/{action}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Payment not found");
    }

    let response = get(&app, "/state/payments/UNKNOWN").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let list = json_body(get(&app, "/state/payments").await).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_recreate_resets_to_pending() {
    let app = setup();
    post(&app, "/state/payments/P1/create").await;
    post(&app, "/state/payments/P1/process").await;

    let response = post(&app, "/state/payments/P1/create").await;

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = json_body(get(&app, "/state/payments/P1").await).await;
    assert_eq!(snapshot["state"], "Pending");
    assert_eq!(snapshot["transitions"], 0);
}

#[tokio::test]
async fn test_reject_policy_returns_409() {
    let app = setup_with_policy(CreatePolicy::Reject);
    post(&app, "/state/payments/P1/create").await;
    post(&app, "/state/payments/P1/process").await;

    let response = post(&app, "/state/payments/P1/create").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let snapshot = json_body(get(&app, "/state/payments/P1").await).await;
    assert_eq!(snapshot["state"], "Processing");
}

#[tokio::test]
async fn test_blank_id_is_bad_request() {
    let app = setup();

    let response = post(&app, "/state/payments/%20/create").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_payments() {
    let app = setup();
    for id in ["B", "A"] {
        post(&app, &format!("/state/payments/{id}/create")).await;
    }
    post(&app, "/state/payments/A/cancel").await;

    let list = json_body(get(&app, "/state/payments").await).await;
    let list = list.as_array().unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["payment_id"], "A");
    assert_eq!(list[0]["state"], "Canceled");
    assert_eq!(list[1]["payment_id"], "B");
    assert_eq!(list[1]["state"], "Pending");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    post(&app, "/state/payments/M1/create").await;
    post(&app, "/state/payments/M1/process").await;

    let response = get(&app, "/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("payment_transitions_total"));
}
