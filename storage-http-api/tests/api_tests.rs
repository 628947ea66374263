//! Integration tests for the SimpleStorage HTTP API.
//!
//! Drives the axum router with `oneshot`, using an in-memory chain reader for
//! validation and error mapping and wiremock as a JSON-RPC node for the
//! end-to-end path.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use axum::body::Body;
use http_body_util::BodyExt;
use hyper::Request;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{Mock, MockServer, Respond, ResponseTemplate, matchers::method};

use storage_http_api::{ApiState, build_router, cors_layer};
use storage_runtime::chain::{ChainReader, ValueUpdatedLog};
use storage_runtime::{ChainQueryService, ServiceConfig, TransportFailure};

#[derive(Default)]
struct FakeReader {
    calls: AtomicUsize,
    failure: Option<&'static str>,
    logs: Vec<ValueUpdatedLog>,
}

impl FakeReader {
    fn failing(message: &'static str) -> Self {
        Self {
            failure: Some(message),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(message) => Err(TransportFailure::new(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChainReader for FakeReader {
    async fn stored_value(&self) -> Result<U256, TransportFailure> {
        self.check()?;
        Ok(U256::from(60u64))
    }

    async fn block_number(&self) -> Result<u64, TransportFailure> {
        self.check()?;
        Ok(12_345_678)
    }

    async fn value_updated_logs(
        &self,
        _from_block: u64,
        _to_block: u64,
    ) -> Result<Vec<ValueUpdatedLog>, TransportFailure> {
        self.check()?;
        Ok(self.logs.clone())
    }
}

fn contract() -> Address {
    Address::repeat_byte(0x8b)
}

fn app(reader: Arc<FakeReader>) -> axum::Router {
    build_router(ApiState::new(ChainQueryService::new(reader, contract())))
}

async fn send(app: axum::Router, request: Request<Body>) -> (u16, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(Arc::new(FakeReader::default())), get("/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_cors_allows_listed_origin() {
    let app = app(Arc::new(FakeReader::default())).layer(cors_layer("http://localhost:3001"));
    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://localhost:3001")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3001"
    );
}

// ── GET /blockchain/value ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_value() {
    let (status, body) =
        send(app(Arc::new(FakeReader::default())), get("/blockchain/value")).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["value"], "60");
    assert_eq!(body["data"]["blockNumber"], "12345678");
    assert_eq!(body["data"]["contractAddress"], format!("{:#x}", contract()));
    assert!(body["data"]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_get_value_timeout_is_503() {
    let reader = Arc::new(FakeReader::failing("request timeout after 10000ms"));
    let (status, body) = send(app(reader), get("/blockchain/value")).await;

    assert_eq!(status, 503);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "RPC_TIMEOUT");
    assert_eq!(body["contractAddress"], format!("{:#x}", contract()));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_get_value_unreachable_is_503() {
    let reader = Arc::new(FakeReader::failing("fetch failed with HTTP status 502"));
    let (status, body) = send(app(reader), get("/blockchain/value")).await;

    assert_eq!(status, 503);
    assert_eq!(body["errorCode"], "RPC_UNREACHABLE");
}

#[tokio::test]
async fn test_get_value_internal_error_hides_cause() {
    let reader = Arc::new(FakeReader::failing("execution reverted: 0xdeadbeef"));
    let (status, body) = send(app(reader), get("/blockchain/value")).await;

    assert_eq!(status, 500);
    assert_eq!(body["errorCode"], "INTERNAL_READ_ERROR");
    assert!(!body.to_string().contains("deadbeef"));
}

// ── POST /blockchain/events ─────────────────────────────────────────────────

#[tokio::test]
async fn test_events_empty_window() {
    let reader = Arc::new(FakeReader::default());
    let (status, body) = send(
        app(reader.clone()),
        post_json("/blockchain/events", r#"{"fromBlock":1000000,"toBlock":1000100}"#),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["events"], json!([]));
    assert_eq!(
        body["data"]["pagination"],
        json!({"fromBlock": 1000000, "toBlock": 1000100, "totalEvents": 0})
    );
    assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_events_mapped() {
    let reader = Arc::new(FakeReader {
        logs: vec![ValueUpdatedLog {
            block_number: Some(1_000_050),
            value: U256::from(61u64),
            tx_hash: Some(B256::repeat_byte(0xab)),
            log_index: Some(0),
        }],
        ..FakeReader::default()
    });
    let (status, body) = send(
        app(reader),
        post_json("/blockchain/events", r#"{"fromBlock":1000000,"toBlock":1000100}"#),
    )
    .await;

    assert_eq!(status, 200);
    let event = &body["data"]["events"][0];
    assert_eq!(event["blockNumber"], "1000050");
    assert_eq!(event["value"], "61");
    assert_eq!(event["txHash"], format!("0x{}", "ab".repeat(32)));
    assert_eq!(event["logIndex"], 0);
    assert_eq!(body["data"]["pagination"]["totalEvents"], 1);
}

#[tokio::test]
async fn test_events_range_too_large_is_400() {
    let reader = Arc::new(FakeReader::default());
    let (status, body) = send(
        app(reader.clone()),
        post_json("/blockchain/events", r#"{"fromBlock":0,"toBlock":2049}"#),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["errorCode"], "RANGE_TOO_LARGE");
    assert_eq!(
        body["errorMessage"],
        "Block range too large. Maximum 2048 blocks per request."
    );
    assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_events_negative_bound_is_400() {
    let reader = Arc::new(FakeReader::default());
    let (status, body) = send(
        app(reader.clone()),
        post_json("/blockchain/events", r#"{"fromBlock":-10,"toBlock":5}"#),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["errorCode"], "NEGATIVE_BOUND");
    assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_events_inverted_range_is_400() {
    let reader = Arc::new(FakeReader::default());
    let (status, body) = send(
        app(reader.clone()),
        post_json("/blockchain/events", r#"{"fromBlock":500,"toBlock":100}"#),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["errorCode"], "INVERTED_RANGE");
    assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_events_malformed_body_is_400() {
    let reader = Arc::new(FakeReader::default());
    for body in [r#"{"fromBlock":"abc","toBlock":1}"#, r#"{"fromBlock":1}"#, "not json"] {
        let (status, json) =
            send(app(reader.clone()), post_json("/blockchain/events", body)).await;
        assert_eq!(status, 400, "body {body}");
        assert_eq!(json["success"], false);
        assert_eq!(json["errorCode"], "INVALID_REQUEST");
    }
    assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_events_unreachable_is_503() {
    let reader = Arc::new(FakeReader::failing("network request failed: connection refused"));
    let (status, body) = send(
        app(reader),
        post_json("/blockchain/events", r#"{"fromBlock":1,"toBlock":2}"#),
    )
    .await;

    assert_eq!(status, 503);
    assert_eq!(body["errorCode"], "RPC_UNREACHABLE");
}

// ── End to end over JSON-RPC ────────────────────────────────────────────────

/// Minimal node answering the reads the service issues, echoing request ids.
struct FujiNode;

impl Respond for FujiNode {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let result = match body["method"].as_str() {
            Some("eth_call") => json!(format!("0x{:064x}", 60)),
            Some("eth_blockNumber") => json!("0xbc614e"),
            Some("eth_getLogs") => json!([]),
            _ => return ResponseTemplate::new(404),
        };
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": body["id"],
            "result": result,
        }))
    }
}

#[tokio::test]
async fn test_value_over_json_rpc() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(FujiNode)
        .mount(&mock_server)
        .await;

    let config = ServiceConfig::default()
        .with_rpc_url(mock_server.uri())
        .with_rpc_timeout(Duration::from_secs(5));
    let service = ChainQueryService::connect(&config).unwrap();
    let app = build_router(ApiState::new(service));

    let (status, body) = send(app.clone(), get("/blockchain/value")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["value"], "60");
    assert_eq!(body["data"]["blockNumber"], "12345678");
    assert_eq!(
        body["data"]["contractAddress"],
        "0x8b427e7f1291dc686bd32315afafe44be50fefce"
    );

    let (status, body) = send(
        app,
        post_json("/blockchain/events", r#"{"fromBlock":1000000,"toBlock":1000100}"#),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["pagination"]["totalEvents"], 0);
}
