use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use super::JsonResponse;

/// Requires the authenticated-user header set by the chat server's proxy.
/// Skips `/health`. Short-circuits if the check is disabled.
pub async fn check(req: Request, next: Next, required: bool, header: String) -> Response {
    if !required || req.uri().path() == "/health" {
        return next.run(req).await;
    }

    let present = req
        .headers()
        .get(header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);

    if present {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(JsonResponse::<()>::err("Not authorized")),
        )
            .into_response()
    }
}
