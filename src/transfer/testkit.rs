//! In-process stub of the transfer and notification backends for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use serde_json::Value;
use tokio::net::TcpListener;

struct StubState {
    transfer_status: Mutex<u16>,
    transfer_body: Mutex<String>,
    transfer_delay: Mutex<Duration>,
    notify_status: Mutex<u16>,
    transfer_calls: AtomicUsize,
    notify_calls: AtomicUsize,
    last_transfer: Mutex<Option<Value>>,
    last_notify: Mutex<Option<Value>>,
    last_authorization: Mutex<Option<String>>,
    last_idempotency_key: Mutex<Option<String>>,
}

/// Stub backend bound to an ephemeral localhost port
pub struct StubBackend {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubBackend {
    /// Start with `/transfer` answering 200 `{"transactionId":"tx-1"}` and
    /// `/notify` answering 200.
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            transfer_status: Mutex::new(200),
            transfer_body: Mutex::new(r#"{"transactionId":"tx-1"}"#.to_string()),
            transfer_delay: Mutex::new(Duration::ZERO),
            notify_status: Mutex::new(200),
            transfer_calls: AtomicUsize::new(0),
            notify_calls: AtomicUsize::new(0),
            last_transfer: Mutex::new(None),
            last_notify: Mutex::new(None),
            last_authorization: Mutex::new(None),
            last_idempotency_key: Mutex::new(None),
        });

        let app = Router::new()
            .route("/transfer", post(transfer))
            .route("/notify", post(notify))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn respond_transfer(&self, status: u16, body: &str) {
        *self.state.transfer_status.lock().unwrap() = status;
        *self.state.transfer_body.lock().unwrap() = body.to_string();
    }

    pub fn set_transfer_delay(&self, delay: Duration) {
        *self.state.transfer_delay.lock().unwrap() = delay;
    }

    pub fn respond_notify(&self, status: u16) {
        *self.state.notify_status.lock().unwrap() = status;
    }

    pub fn transfer_calls(&self) -> usize {
        self.state.transfer_calls.load(Ordering::SeqCst)
    }

    pub fn notify_calls(&self) -> usize {
        self.state.notify_calls.load(Ordering::SeqCst)
    }

    pub fn last_transfer_body(&self) -> Option<Value> {
        self.state.last_transfer.lock().unwrap().clone()
    }

    pub fn last_notify_body(&self) -> Option<Value> {
        self.state.last_notify.lock().unwrap().clone()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    pub fn last_idempotency_key(&self) -> Option<String> {
        self.state.last_idempotency_key.lock().unwrap().clone()
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn transfer(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.transfer_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_transfer.lock().unwrap() = serde_json::from_str(&body).ok();
    *state.last_authorization.lock().unwrap() =
        header_value(&headers, header::AUTHORIZATION.as_str());

    let delay = *state.transfer_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(*state.transfer_status.lock().unwrap()).unwrap();
    let body = state.transfer_body.lock().unwrap().clone();
    (status, body)
}

async fn notify(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    state.notify_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_notify.lock().unwrap() = serde_json::from_str(&body).ok();
    *state.last_idempotency_key.lock().unwrap() = header_value(&headers, "idempotency-key");

    StatusCode::from_u16(*state.notify_status.lock().unwrap()).unwrap()
}
