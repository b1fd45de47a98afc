//! Scenario tests for the REST backend against an in-process mock server.
//!
//! The mock binds an ephemeral 127.0.0.1 port and scripts the backend's
//! envelope conventions: 401-until-refreshed, `success: false` business
//! rejections with a `UImessage`, and bare non-JSON error bodies.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use tfn_api::{ApiClient, ApiConfig, ApiError, OrderBackend, RestBackend};
use tfn_lifecycle::OrderAction;
use tfn_schemas::{CreateOrderDraft, DraftItem, OrderStatus, Role};

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockState {
    refreshed: AtomicBool,
    refresh_calls: AtomicUsize,
    refresh_fails: AtomicBool,
}

async fn refresh(State(st): State<Arc<MockState>>) -> (StatusCode, Json<Value>) {
    st.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if st.refresh_fails.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false })),
        );
    }
    st.refreshed.store(true, Ordering::SeqCst);
    (StatusCode::OK, Json(json!({ "success": true })))
}

async fn user_orders(State(st): State<Arc<MockState>>) -> (StatusCode, Json<Value>) {
    if !st.refreshed.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "session expired" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "orders": [{
                "order_id": 42,
                "customer_id": 7,
                "store_id": 3,
                "total_price": 180.5,
                "order_status": "pending",
                "order_date": "2026-02-10T09:30:00Z",
                "order_otp": "4821",
                "items": []
            }]
        })),
    )
}

async fn confirm(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!({ "success": true }))
}

async fn verify(Path(_id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    if body["order_otp"] == "4821" {
        Json(json!({ "success": true }))
    } else {
        Json(json!({ "success": false, "UImessage": "Incorrect code" }))
    }
}

async fn order_detail(Path(_id): Path<i64>) -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "no such order")
}

async fn create_order(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "success": true,
        "order": {
            "order_id": 101,
            "customer_id": 7,
            "store_id": body["store_id"],
            "total_price": 95.0,
            "payment_id": body["payment_id"],
            "order_status": "PENDING",
            "order_date": "2026-02-10T11:00:00Z",
            "order_otp": "4821",
            "items": [{ "item_name": "Chai", "quantity": 2, "price": 47.5 }]
        }
    }))
}

async fn spawn_mock(state: Arc<MockState>) -> String {
    let app = Router::new()
        .route("/users/refresh", post(refresh))
        .route("/users/orders", get(user_orders))
        .route("/orders", post(create_order))
        .route("/orders/:id", get(order_detail))
        .route("/orders/:id/confirm", patch(confirm))
        .route("/orders/:id/verify", post(verify))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend crashed");
    });
    format!("http://{addr}")
}

fn backend_at(base: &str) -> RestBackend {
    RestBackend::new(ApiClient::new(ApiConfig::new(base)).expect("client"))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_session_refreshes_once_and_retries() {
    let state = Arc::new(MockState::default());
    let base = spawn_mock(Arc::clone(&state)).await;
    let backend = backend_at(&base);

    let orders = backend.fetch_orders(Role::Customer).await.expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, 42);
    assert_eq!(orders[0].total_price, 18_050);
    assert_eq!(
        state.refresh_calls.load(Ordering::SeqCst),
        1,
        "exactly one refresh call"
    );
}

#[tokio::test]
async fn failed_refresh_surfaces_an_auth_error() {
    let state = Arc::new(MockState::default());
    state.refresh_fails.store(true, Ordering::SeqCst);
    let base = spawn_mock(Arc::clone(&state)).await;
    let backend = backend_at(&base);

    let err = backend.fetch_orders(Role::Customer).await.unwrap_err();
    assert_eq!(err, ApiError::Auth);
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn business_rejection_carries_the_backend_message_verbatim() {
    let state = Arc::new(MockState::default());
    state.refreshed.store(true, Ordering::SeqCst);
    let base = spawn_mock(state).await;
    let backend = backend_at(&base);

    let err = backend
        .transition(42, OrderAction::Verify, Some("0000"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            message: "Incorrect code".to_string()
        }
    );
}

#[tokio::test]
async fn successful_transition_resolves_clean() {
    let state = Arc::new(MockState::default());
    state.refreshed.store(true, Ordering::SeqCst);
    let base = spawn_mock(state).await;
    let backend = backend_at(&base);

    backend
        .transition(42, OrderAction::Confirm, None)
        .await
        .expect("confirm should succeed");
}

#[tokio::test]
async fn non_json_error_body_still_becomes_a_rejection() {
    let state = Arc::new(MockState::default());
    state.refreshed.store(true, Ordering::SeqCst);
    let base = spawn_mock(state).await;
    let backend = backend_at(&base);

    let err = backend.fetch_order(42).await.unwrap_err();
    match err {
        ApiError::Rejected { message } => {
            assert!(message.starts_with("Request failed with status 404"), "{message}")
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn order_placement_returns_the_generated_pickup_code() {
    let state = Arc::new(MockState::default());
    state.refreshed.store(true, Ordering::SeqCst);
    let base = spawn_mock(state).await;
    let backend = backend_at(&base);

    let draft = CreateOrderDraft {
        store_id: 3,
        payment_id: "pay_81".to_string(),
        items: vec![DraftItem {
            menu_item_id: 12,
            quantity: 2,
        }],
    };
    let order = backend.create_order(&draft).await.expect("create");
    assert_eq!(order.order_id, 101);
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.order_otp.as_deref(), Some("4821"));
    assert_eq!(order.total_price, 9_500);
    assert_eq!(order.items_total(), order.total_price);
}

#[tokio::test]
async fn unreachable_backend_is_a_retryable_transport_error() {
    // Nothing listens here; connection is refused immediately.
    let backend = backend_at("http://127.0.0.1:9");

    let err = backend.fetch_orders(Role::Store).await.unwrap_err();
    assert!(err.is_retryable(), "{err:?}");
    assert!(matches!(err, ApiError::Transport(_)));
}
