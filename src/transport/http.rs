// ============================================================
// Layer 4 — HTTP Transport (axum)
// ============================================================
// Endpoints are registered only for the capabilities the service
// reports when the router is built:
//
//   keyed service (dynamic)        unkeyed service (static)
//   PUT    /:key   train           —
//   POST   /:key   predict         POST /   predict, key = ""
//   DELETE /:key   remove          —
//   GET    /       describe        GET  /   describe
//
// Request bodies are {"input": <json>}. The input is checked
// against the trainer's declared type before the service is called;
// a body without `input` (axum) or with a wrongly typed one (here)
// is answered 422.
//
// Outcome → status:
//   train   Success 201 | Error 500 {"error": cause}
//   predict Success 200 <output> | NotFound 404 | Error 500 {"error": cause}
//   remove  Success 202 | NotFound 404
//   bad input on train / predict → 422 {"error": message}
//   storage fault on any of them → 500 {"error": message}
//
// Service calls run on tokio's blocking pool: user trainers and
// custom storage backends are free to block.
//
// Reference: axum documentation (Router, MethodRouter, IntoResponse)

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Json, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;

use crate::application::service::{
    Addressing, Capabilities, ModelService, PredictionService, RemovingService, TrainingService,
};
use crate::domain::protocol::{
    PredictRequest, PredictResponse, RemoveRequest, RemoveResponse, TrainRequest, TrainResponse,
};
use crate::infra::config::ServerConfig;
use crate::infra::storage::StorageError;
use crate::ml::erased::{InputCheck, InputError, TypeDescriptor};
use crate::ml::loader::ModuleInfo;
use crate::transport::{ServiceRunner, StopHandle};

/// A service whose inputs and outputs are all JSON.
pub type JsonService = dyn ModelService<String, Value, Value, Value>;

/// Key used for every request to an unkeyed service.
pub const UNKEYED: &str = "";

/// Body of train and predict requests.
#[derive(Debug, Deserialize)]
pub struct InputBody {
    pub input: Value,
}

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Every non-success outcome, mapped to a status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("model not found")]
    NotFound,

    #[error(transparent)]
    BadInput(#[from] InputError),

    #[error("{0:#}")]
    UserCode(anyhow::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("service task failed: {0}")]
    Task(#[from] JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::BadInput(e) => {
                let body = Json(json!({ "error": e.to_string() }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

async fn handle_train(
    service: Arc<dyn TrainingService<String, Value>>,
    check:   InputCheck,
    key:     String,
    input:   Value,
) -> Result<StatusCode, ApiError> {
    check(&input)?;

    let response =
        tokio::task::spawn_blocking(move || service.train(TrainRequest { key, input })).await??;

    match response {
        TrainResponse::Success { .. }       => Ok(StatusCode::CREATED),
        TrainResponse::Error { cause, .. }  => Err(ApiError::UserCode(cause)),
    }
}

async fn handle_predict(
    service: Arc<dyn PredictionService<String, Value, Value>>,
    check:   InputCheck,
    key:     String,
    input:   Value,
) -> Result<Json<Value>, ApiError> {
    check(&input)?;

    let response =
        tokio::task::spawn_blocking(move || service.predict(PredictRequest { key, input })).await??;

    match response {
        PredictResponse::Success { output, .. } => Ok(Json(output)),
        PredictResponse::NotFound { .. }        => Err(ApiError::NotFound),
        PredictResponse::Error { cause, .. }    => Err(ApiError::UserCode(cause)),
    }
}

async fn handle_remove(
    service: Arc<dyn RemovingService<String>>,
    key:     String,
) -> Result<StatusCode, ApiError> {
    let response =
        tokio::task::spawn_blocking(move || service.remove(RemoveRequest { key })).await??;

    match response {
        RemoveResponse::Success { .. }  => Ok(StatusCode::ACCEPTED),
        RemoveResponse::NotFound { .. } => Err(ApiError::NotFound),
    }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// What `GET /` reports about the running service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDescription {
    pub addressing:   Addressing,
    pub capabilities: Capabilities,
    pub types:        DescribedTypes,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescribedTypes {
    pub train_input:    TypeDescriptor,
    pub predict_input:  TypeDescriptor,
    pub predict_output: TypeDescriptor,
}

/// Wire the endpoints `service` supports. Capabilities are queried
/// here, once; requests never re-check them.
pub fn build_router(info: &ModuleInfo, service: Arc<JsonService>) -> Router {
    let addressing    = service.addressing();
    let capabilities  = Arc::clone(&service).capabilities();
    let train_check   = info.train_input_check;
    let predict_check = info.predict_input_check;

    let mut endpoint: MethodRouter = MethodRouter::new();

    match addressing {
        Addressing::Keyed => {
            if let Some(svc) = Arc::clone(&service).training() {
                endpoint = endpoint.put(move |Path(key): Path<String>, Json(body): Json<InputBody>| {
                    handle_train(Arc::clone(&svc), train_check, key, body.input)
                });
            }
            if let Some(svc) = Arc::clone(&service).prediction() {
                endpoint = endpoint.post(move |Path(key): Path<String>, Json(body): Json<InputBody>| {
                    handle_predict(Arc::clone(&svc), predict_check, key, body.input)
                });
            }
            if let Some(svc) = Arc::clone(&service).removing() {
                endpoint = endpoint.delete(move |Path(key): Path<String>| {
                    handle_remove(Arc::clone(&svc), key)
                });
            }
        }
        Addressing::Unkeyed => {
            if let Some(svc) = Arc::clone(&service).training() {
                endpoint = endpoint.put(move |Json(body): Json<InputBody>| {
                    handle_train(Arc::clone(&svc), train_check, UNKEYED.to_string(), body.input)
                });
            }
            if let Some(svc) = Arc::clone(&service).prediction() {
                endpoint = endpoint.post(move |Json(body): Json<InputBody>| {
                    handle_predict(Arc::clone(&svc), predict_check, UNKEYED.to_string(), body.input)
                });
            }
            if let Some(svc) = service.removing() {
                endpoint = endpoint.delete(move || handle_remove(Arc::clone(&svc), UNKEYED.to_string()));
            }
        }
    }

    let description = ServiceDescription {
        addressing,
        capabilities,
        types: DescribedTypes {
            train_input:    info.train_input_type,
            predict_input:  info.predict_input_type,
            predict_output: info.predict_output_type,
        },
    };
    let describe = get(move || async move { Json(description) });

    let router = match addressing {
        Addressing::Keyed   => Router::new().route("/", describe).route("/:key", endpoint),
        Addressing::Unkeyed => Router::new().route("/", endpoint.merge(describe)),
    };

    tracing::info!(?addressing, ?capabilities, "HTTP endpoints registered");

    router.layer(TraceLayer::new_for_http())
}

// ─── Runner ───────────────────────────────────────────────────────────────────

/// Serves a JSON service over HTTP until stopped or interrupted.
pub struct HttpServiceRunner {
    config: ServerConfig,
    router: Router,
    stop:   StopHandle,
}

impl HttpServiceRunner {
    pub fn new(config: ServerConfig, info: &ModuleInfo, service: Arc<JsonService>) -> Self {
        Self {
            config,
            router: build_router(info, service),
            stop:   StopHandle::new(),
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

impl ServiceRunner for HttpServiceRunner {
    async fn start(self) -> Result<()> {
        let addr = self.config.socket_addr()?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        tracing::info!("Serving on http://{}", listener.local_addr()?);

        let stop = self.stop.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = stop.stopped() => tracing::info!("stop requested"),
                    _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
                }
            })
            .await
            .context("HTTP server failed")?;

        tracing::info!("Server stopped");
        Ok(())
    }

    fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}
