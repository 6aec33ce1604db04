use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use logsink_core::error::LogsinkError;
use logsink_core::filter::FilterSpec;
use logsink_core::query::{ErrorResponse, IngestResponse, QueryResponse, StatusResponse};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::coordinator::{IngestError, Ingestor};

#[derive(Clone)]
pub struct HttpState {
    pub ingestor: Ingestor,
    pub request_timeout: Duration,
}

pub fn router(ingestor: Ingestor, request_timeout: Duration) -> Router {
    let state = HttpState {
        ingestor,
        request_timeout,
    };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    Router::new()
        .route("/logs", get(query_logs).post(receive_logs))
        .route("/status", get(status))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn receive_logs(
    State(state): State<HttpState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let payload = serde_json::from_slice::<Value>(&body).ok();
    if payload.is_none() && !body.is_empty() {
        tracing::warn!(bytes = body.len(), "ingest body is not valid JSON");
    }

    // The store checks the deadline before commit. A late batch rolls back.
    let deadline = Instant::now().checked_add(state.request_timeout);
    let ingestor = state.ingestor.clone();
    let report = tokio::task::spawn_blocking(move || {
        ingestor.ingest_before(auth.as_deref(), payload.as_ref(), deadline)
    })
    .await
    .map_err(|e| ApiError::internal(format!("ingest task failed: {e}")))??;

    Ok(Json(IngestResponse {
        message: "logs received".to_string(),
        accepted: report.accepted,
        rejected: report.rejected,
    }))
}

async fn query_logs(
    State(state): State<HttpState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let predicate = FilterSpec::from_pairs(pairs).compile();
    let store = state.ingestor.store().clone();
    let logs = run_blocking(state.request_timeout, move || {
        store.query(&predicate).map_err(ApiError::from)
    })
    .await?;
    tracing::debug!(count = logs.len(), "log query served");
    Ok(Json(QueryResponse::new(logs)))
}

async fn status(State(state): State<HttpState>) -> Result<Json<StatusResponse>, ApiError> {
    let store = state.ingestor.store().clone();
    let status = run_blocking(state.request_timeout, move || {
        store.status().map_err(ApiError::from)
    })
    .await?;
    Ok(Json(status))
}

async fn run_blocking<T, F>(timeout: Duration, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(res)) => res,
        Ok(Err(e)) => Err(ApiError::internal(format!("store task failed: {e}"))),
        Err(_) => Err(ApiError::internal(format!(
            "store operation timed out after {timeout:?}"
        ))),
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    fn internal(message: String) -> Self {
        tracing::error!(%message, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        let status = match &err {
            IngestError::Unauthorized => StatusCode::UNAUTHORIZED,
            IngestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            IngestError::Storage(_) => return Self::internal(err.to_string()),
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<LogsinkError> for ApiError {
    fn from(err: LogsinkError) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
