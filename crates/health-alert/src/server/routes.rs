use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

use super::Server;
use crate::{sources::PipelineOutcome, Error};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn metrics() -> Result<String, Error> {
    crate::metrics::gather_metrics()
}

/// Azure Monitor action group webhook. Accepts GET and POST.
pub async fn health_alert(State(server): State<Arc<Server>>, body: Bytes) -> Response {
    // A missing or malformed body is validated as `null` so it is reported
    // like any other schema violation.
    let raw: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!("Request body is not JSON: {}", e);
        Value::Null
    });

    match server.handler.process(&raw).await {
        Ok(outcome) => {
            let status = match outcome {
                PipelineOutcome::Success(_) => StatusCode::OK,
                PipelineOutcome::BadRequest(_) => StatusCode::BAD_REQUEST,
            };
            (status, outcome.body().to_string()).into_response()
        }
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Error handling request: {}", self);
        let body = match self {
            Error::Internal(_) => self.to_string(),
            _ => format!("Internal error: {}", self),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
