//! HTTP transport - maps requests to action dispatch.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` - `{ "ok": true, "actions": [...] }`.
//! - `GET /:command` - dispatch with query parameters as input.
//! - `POST /:command` - dispatch with a JSON body (empty body = `{}`).
//!
//! Responses are `text/html`. Every re-issued state token is also set as a
//! response header named after its request header.
//!
//! ## Example
//!
//! ```ignore
//! let service = Arc::new(Service::from_config(ServiceConfig::from_env()?, views)?);
//! swapped_rust::service::serve(service, "0.0.0.0:3000").await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::dispatch::Service;
use super::error::HandlerError;
use super::request::RequestHeaders;

const HTML: &str = "text/html; charset=utf-8";

/// Build an axum `Router` dispatching actions via the given service.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/:command", get(query_handler).post(body_handler))
        .with_state(service)
}

/// Serve the service over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(service: Arc<Service>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await
}

async fn health_handler(State(service): State<Arc<Service>>) -> impl IntoResponse {
    let actions = service.actions();
    let tables = service.registry().type_ids();
    Json(json!({ "ok": true, "actions": actions, "tables": tables }))
}

async fn query_handler(
    State(service): State<Arc<Service>>,
    Path(command): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let input: serde_json::Map<String, Value> =
        params.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    respond(&service, &command, Value::Object(input), &headers)
}

async fn body_handler(
    State(service): State<Arc<Service>>,
    Path(command): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(input) => input,
            Err(e) => return error_response(HandlerError::from(e)),
        }
    };
    respond(&service, &command, input, &headers)
}

fn respond(service: &Service, command: &str, input: Value, headers: &HeaderMap) -> Response {
    match service.dispatch(command, input, request_from_headers(headers)) {
        Ok(rendered) => {
            let mut response = (StatusCode::OK, [(CONTENT_TYPE, HTML)], rendered.body).into_response();
            for (name, token) in rendered.tokens {
                match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&token)) {
                    (Ok(name), Ok(value)) => {
                        response.headers_mut().insert(name, value);
                    }
                    _ => tracing::warn!(header = %name, "cannot emit state token header"),
                }
            }
            response
        }
        Err(e) => error_response(e),
    }
}

fn error_response(err: HandlerError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "action failed");
    } else {
        tracing::debug!(error = %err, "action rejected");
    }
    (status, err.to_string()).into_response()
}

/// All headers, lower-cased, become request headers.
fn request_from_headers(headers: &HeaderMap) -> RequestHeaders {
    let mut map = HashMap::new();
    for (name, value) in headers.iter() {
        if let Ok(v) = value.to_str() {
            map.insert(name.as_str().to_string(), v.to_string());
        }
    }
    RequestHeaders::from_map(map)
}
