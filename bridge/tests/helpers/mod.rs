//! Test helpers: an in-process stand-in for the K3 Cloud web API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use k3_bridge::config::Config;
use serde_json::Value;

type Responder = Arc<dyn Fn(&Value) -> (StatusCode, String) + Send + Sync>;

/// A request as the gateway received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Warehouse number from the query's filter string.
    pub fn warehouse(&self) -> String {
        warehouse_of(&self.body)
    }
}

#[derive(Clone)]
struct GatewayState {
    responder: Responder,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Running fake gateway.
pub struct FakeGateway {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeGateway {
    /// Site root to use as `server_url`.
    pub fn server_url(&self) -> String {
        format!("http://{}/K3Cloud", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Test configuration pointed at this gateway.
    pub fn config(&self) -> Config {
        Config {
            server_url: self.server_url(),
            ..Config::default_for_test()
        }
    }
}

/// Start a gateway answering every call with `responder(body)`.
pub async fn spawn_gateway<F>(responder: F) -> FakeGateway
where
    F: Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
{
    serve(Arc::new(responder), Router::new().fallback(handle)).await
}

/// Start a gateway that records every call and never answers it.
pub async fn spawn_silent_gateway() -> FakeGateway {
    let responder: Responder = Arc::new(|_| (StatusCode::OK, String::new()));
    serve(responder, Router::new().fallback(handle_silently)).await
}

async fn serve(responder: Responder, router: Router<GatewayState>) -> FakeGateway {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = GatewayState {
        responder,
        requests: requests.clone(),
    };

    let app = router.with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test gateway");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test gateway");
    });

    FakeGateway { addr, requests }
}

async fn handle(
    State(state): State<GatewayState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let body = record(&state, &uri, &headers, &body);
    (state.responder)(&body)
}

async fn handle_silently(
    State(state): State<GatewayState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    record(&state, &uri, &headers, &body);
    std::future::pending().await
}

fn record(state: &GatewayState, uri: &Uri, headers: &HeaderMap, body: &str) -> Value {
    let body: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let headers = headers
        .iter()
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|v| (k.as_str().to_string(), v.to_string()))
        })
        .collect();

    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        headers,
        body: body.clone(),
    });

    body
}

/// Warehouse number from a bill query body.
pub fn warehouse_of(body: &Value) -> String {
    body["data"]["FilterString"]
        .as_str()
        .and_then(|f| f.strip_prefix("FStockID.Fnumber='"))
        .and_then(|f| f.strip_suffix('\''))
        .unwrap_or_default()
        .to_string()
}

/// One inventory row in the vendor's array layout.
pub fn row(material: &str, warehouse: &str, quantity: f64) -> Value {
    serde_json::json!([
        material,
        format!("{material} name"),
        warehouse,
        format!("{warehouse} store"),
        quantity
    ])
}

/// Gateway body listing `rows`.
pub fn rows_body(rows: Vec<Value>) -> (StatusCode, String) {
    (StatusCode::OK, Value::Array(rows).to_string())
}
