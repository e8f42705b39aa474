pub mod auth;
mod routes;

pub use routes::create_router;

use crate::config::SecurityConfig;
use crate::directory::SharedDirectory;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub directory: SharedDirectory,
    pub plugin_id: String,
    pub start_time: std::time::Instant,
}

/// JSON response wrapper
#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> JsonResponse<()> {
        JsonResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Error returned by HTTP handlers, rendered as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(JsonResponse::<()>::err(self.message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Router with the user-header check and request tracing applied.
pub fn build_app(state: AppState, security: &SecurityConfig) -> Router {
    let required = security.require_user_header;
    let header = security.user_header.clone();
    create_router(state)
        .layer(axum::middleware::from_fn(move |req, next| {
            let header = header.clone();
            async move { auth::check(req, next, required, header).await }
        }))
        .layer(TraceLayer::new_for_http())
}
