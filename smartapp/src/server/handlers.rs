//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::context::RequestContext;
use crate::errors::SmartAppError;
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Version of the HTTP API served here
pub const API_VERSION: &str = "1.0.0";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

/// Version response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub package: String,
    pub api: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        package: version.version,
        api: API_VERSION.to_string(),
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Lifecycle webhook handler
pub async fn smartapp_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, SmartAppError> {
    let context = RequestContext::new(headers, body);
    let json = state.dispatcher.dispatch(&context).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], json).into_response())
}

// Errors are logged here, once, and the client only sees the status.
impl IntoResponse for SmartAppError {
    fn into_response(self) -> Response {
        let correlation_id = self.correlation_id();
        let status = match &self {
            SmartAppError::BadRequest { .. } => {
                warn!(correlation_id, "Rejected lifecycle request: {}", self);
                StatusCode::BAD_REQUEST
            }
            SmartAppError::Signature(_) => {
                warn!(correlation_id, "Rejected lifecycle request: {}", self);
                StatusCode::UNAUTHORIZED
            }
            SmartAppError::Internal { .. } => {
                error!(correlation_id, "Lifecycle request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        status.into_response()
    }
}
