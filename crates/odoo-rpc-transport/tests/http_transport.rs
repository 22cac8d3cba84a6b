//! `HttpTransport` against a throwaway local server.

use std::net::SocketAddr;

use axum::{Json, Router, http::StatusCode, routing::post};
use odoo_rpc_core::{Transport, TransportError};
use odoo_rpc_transport::{HttpTransport, HttpTransportConfig};
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "jsonrpc": "2.0", "id": body["id"], "result": body }))
}

async fn server_error_json() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": { "data": { "message": "boom" } } })),
    )
}

async fn server_error_text() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "upstream unavailable")
}

async fn not_json() -> &'static str {
    "<html>login</html>"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    Json(json!({ "result": true }))
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/jsonrpc", post(echo))
        .route("/error-json", post(server_error_json))
        .route("/error-text", post(server_error_text))
        .route("/not-json", post(not_json))
        .route("/slow", post(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn posts_json_and_decodes_reply() {
    let addr = spawn_server().await;
    let transport = HttpTransport::new().unwrap();
    let body = json!({
        "jsonrpc": "2.0",
        "method": "call",
        "params": { "service": "common", "method": "version", "args": [] },
        "id": 1
    });

    let reply = assert_ok!(
        transport
            .post_json(&format!("http://{addr}/jsonrpc"), &body)
            .await
    );
    assert_eq!(reply["result"], body);
    assert_eq!(reply["id"], 1);
}

#[tokio::test]
async fn non_success_with_json_body_is_returned() {
    let addr = spawn_server().await;
    let transport = HttpTransport::new().unwrap();

    let reply = assert_ok!(
        transport
            .post_json(&format!("http://{addr}/error-json"), &json!({}))
            .await
    );
    assert_eq!(reply["error"]["data"]["message"], "boom");
}

#[tokio::test]
async fn non_success_without_json_body_is_status_error() {
    let addr = spawn_server().await;
    let transport = HttpTransport::new().unwrap();

    let err = assert_err!(
        transport
            .post_json(&format!("http://{addr}/error-text"), &json!({}))
            .await
    );
    match err {
        TransportError::Status { status, body, .. } => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn success_without_json_body_is_decode_error() {
    let addr = spawn_server().await;
    let transport = HttpTransport::new().unwrap();

    let err = assert_err!(
        transport
            .post_json(&format!("http://{addr}/not-json"), &json!({}))
            .await
    );
    assert!(matches!(err, TransportError::Decode { .. }));
}

#[tokio::test]
async fn timeout_is_reported() {
    let addr = spawn_server().await;
    let transport =
        HttpTransport::with_config(&HttpTransportConfig::default().with_timeout(1)).unwrap();

    let err = assert_err!(
        transport
            .post_json(&format!("http://{addr}/slow"), &json!({}))
            .await
    );
    assert!(matches!(err, TransportError::Timeout { .. }));
}

#[tokio::test]
async fn unreachable_server_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new().unwrap();
    let err = assert_err!(
        transport
            .post_json(&format!("http://{addr}/jsonrpc"), &json!({}))
            .await
    );
    assert!(matches!(err, TransportError::Request { .. }));
}
