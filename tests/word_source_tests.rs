use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use minpair_backend::engine::types::ExclusionSet;
use minpair_backend::services::word_source::{
    GenerationError, OllamaWordSource, WordRequest, WordSource, WordSourceConfig,
};

#[derive(Clone)]
struct Stub {
    reply: Arc<dyn Fn() -> Response + Send + Sync>,
    seen: Arc<Mutex<Vec<Value>>>,
    delay: Duration,
}

async fn generate(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.seen.lock().unwrap().push(body);
    tokio::time::sleep(stub.delay).await;
    (stub.reply)()
}

async fn spawn_stub(stub: Stub) -> String {
    let app = Router::new()
        .route("/api/generate", post(generate))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/generate")
}

fn stub(reply: impl Fn() -> Response + Send + Sync + 'static) -> Stub {
    Stub {
        reply: Arc::new(reply),
        seen: Arc::default(),
        delay: Duration::ZERO,
    }
}

fn source(endpoint: String, timeout: Duration) -> OllamaWordSource {
    OllamaWordSource::new(WordSourceConfig {
        enabled: true,
        endpoint,
        model: "test-model".to_string(),
        timeout,
    })
}

async fn propose(
    source: &OllamaWordSource,
    temperature: Option<f64>,
) -> Result<String, GenerationError> {
    let excluded = ExclusionSet::new();
    let request = WordRequest {
        prompt: "Output ONLY the word.",
        excluded: &excluded,
        temperature,
    };
    source.propose(&request).await
}

#[tokio::test]
async fn test_returns_raw_response_text() {
    let stub = stub(|| Json(json!({ "response": " Bed.\n", "done": true })).into_response());
    let seen = stub.seen.clone();
    let endpoint = spawn_stub(stub).await;

    let word = propose(&source(endpoint, Duration::from_secs(2)), None)
        .await
        .unwrap();

    assert_eq!(word, " Bed.\n");
    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["model"], "test-model");
    assert_eq!(requests[0]["stream"], false);
    assert_eq!(requests[0]["prompt"], "Output ONLY the word.");
    assert!(requests[0].get("options").is_none());
}

#[tokio::test]
async fn test_temperature_is_forwarded() {
    let stub = stub(|| Json(json!({ "response": "dog" })).into_response());
    let seen = stub.seen.clone();
    let endpoint = spawn_stub(stub).await;

    propose(&source(endpoint, Duration::from_secs(2)), Some(0.8))
        .await
        .unwrap();

    assert_eq!(seen.lock().unwrap()[0]["options"]["temperature"], 0.8);
}

#[tokio::test]
async fn test_non_success_status() {
    let stub = stub(|| (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded").into_response());
    let endpoint = spawn_stub(stub).await;

    let err = propose(&source(endpoint, Duration::from_secs(2)), None)
        .await
        .unwrap_err();

    match err {
        GenerationError::HttpStatus { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_payload() {
    let missing = spawn_stub(stub(|| Json(json!({ "done": true })).into_response())).await;
    let err = propose(&source(missing, Duration::from_secs(2)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Malformed(_)));

    let garbage = spawn_stub(stub(|| "not json".into_response())).await;
    let err = propose(&source(garbage, Duration::from_secs(2)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Malformed(_)));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let mut slow = stub(|| Json(json!({ "response": "bed" })).into_response());
    slow.delay = Duration::from_secs(3);
    let endpoint = spawn_stub(slow).await;

    let err = propose(&source(endpoint, Duration::from_millis(100)), None)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Timeout(_)));
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = propose(
        &source(format!("http://{addr}/api/generate"), Duration::from_secs(2)),
        None,
    )
    .await
    .unwrap_err();

    assert!(err.is_unavailable());
}
