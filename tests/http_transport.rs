//! HTTP transport tests. Requests go straight into the axum router;
//! no socket is opened.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use model_serve::cli::{dynamic_service, static_service};
use model_serve::infra::config::ServerConfig;
use model_serve::ml::demo::SCALED_SQUARE;
use model_serve::transport::http::{build_router, HttpServiceRunner};
use model_serve::transport::ServiceRunner;
use model_serve::{EntrypointLoader, ModuleInfo};

fn module() -> ModuleInfo {
    EntrypointLoader::with_builtins().unwrap().load(SCALED_SQUARE, &[]).unwrap()
}

fn dynamic_router() -> Router {
    let module = module();
    build_router(&module, dynamic_service(&module))
}

fn static_router(train_input: &str) -> Router {
    let module = module();
    build_router(&module, static_service(&module, train_input).unwrap())
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status   = response.status();
    let bytes    = response.into_body().collect().await.unwrap().to_bytes();
    // axum's own rejections are plain text
    let value    = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

// ---------------------------------------------------------------------------
// Dynamic deployments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_dynamic_lifecycle_over_http() {
    let router = dynamic_router();

    let (status, _) = send(&router, Method::PUT, "/m", Some(json!({"input": 2}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, Method::POST, "/m", Some(json!({"input": 3}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(18));

    let (status, _) = send(&router, Method::DELETE, "/m", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = send(&router, Method::POST, "/m", Some(json!({"input": 3}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::DELETE, "/m", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_training_error_is_reported() {
    let router = dynamic_router();

    let (status, body) = send(&router, Method::PUT, "/m", Some(json!({"input": -1}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("scale must be non-negative"));

    let (status, _) = send(&router, Method::POST, "/m", Some(json!({"input": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prediction_error_is_reported() {
    let router = dynamic_router();
    send(&router, Method::PUT, "/m", Some(json!({"input": 2}))).await;

    let (status, body) =
        send(&router, Method::POST, "/m", Some(json!({"input": i64::MAX}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("overflows"));
}

#[tokio::test]
async fn test_wrongly_typed_training_input_is_unprocessable() {
    let router = dynamic_router();

    let (status, body) = send(&router, Method::PUT, "/m", Some(json!({"input": "four"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("not a valid i64"));

    let (status, _) = send(&router, Method::POST, "/m", Some(json!({"input": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrongly_typed_prediction_input_is_unprocessable() {
    let router = dynamic_router();
    send(&router, Method::PUT, "/m", Some(json!({"input": 2}))).await;

    let (status, body) = send(&router, Method::POST, "/m", Some(json!({"input": "five"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("not a valid i64"));

    // a missing field is rejected the same way
    let (status, _) = send(&router, Method::POST, "/m", Some(json!({"x": 5}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&router, Method::POST, "/m", Some(json!({"input": 5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(50));
}

#[tokio::test]
async fn test_dynamic_description() {
    let (status, body) = send(&dynamic_router(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["addressing"], json!("keyed"));
    assert_eq!(body["capabilities"], json!({"train": true, "predict": true, "remove": true}));
    assert_eq!(body["types"]["predict_output"], json!("i64"));
}

// ---------------------------------------------------------------------------
// Static deployments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_static_predicts_without_a_key() {
    let router = static_router("3");

    let (status, body) = send(&router, Method::POST, "/", Some(json!({"input": 2}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(12));
}

#[tokio::test]
async fn test_static_rejects_wrongly_typed_input() {
    let (status, _) =
        send(&static_router("3"), Method::POST, "/", Some(json!({"input": [1, 2]}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_static_exposes_no_train_or_remove() {
    let router = static_router("3");

    let (status, _) = send(&router, Method::PUT, "/", Some(json!({"input": 1}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(&router, Method::DELETE, "/", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(&router, Method::POST, "/m", Some(json!({"input": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_description() {
    let (status, body) = send(&static_router("1"), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["addressing"], json!("unkeyed"));
    assert_eq!(body["capabilities"], json!({"train": false, "predict": true, "remove": false}));
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_runner_stops_on_request() {
    let module = module();
    let config = ServerConfig { host: "127.0.0.1".to_string(), port: 0 };
    let runner = HttpServiceRunner::new(config, &module, dynamic_service(&module));
    let stop   = runner.stop_handle();

    let server = tokio::spawn(runner.start());
    stop.stop();

    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_runner_reports_bind_failures() {
    let module = module();
    let config = ServerConfig { host: "not a host".to_string(), port: 1 };
    let runner = HttpServiceRunner::new(config, &module, dynamic_service(&module));

    assert!(runner.start().await.is_err());
}
