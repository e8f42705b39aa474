use super::{ApiError, ApiResult, AppState, JsonResponse};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use pingboard_core::{IdentifierKind, ProfileRecord};
use serde::{Deserialize, Serialize};

pub fn create_router(state: AppState) -> Router {
    let plugin_routes = Router::new().route("/user", get(get_user));

    Router::new()
        .route("/health", get(health))
        .nest(&format!("/plugins/{}", state.plugin_id), plugin_routes)
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    version: String,
    uptime_seconds: u64,
    directory: DirectoryStatus,
}

#[derive(Serialize)]
struct DirectoryStatus {
    loaded: bool,
    users: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refreshed_at: Option<String>,
}

async fn health(State(state): State<AppState>) -> Json<JsonResponse<HealthResponse>> {
    let directory = state.directory.current().await;
    let status = match directory {
        Some(d) => DirectoryStatus {
            loaded: true,
            users: d.len(),
            company: Some(d.company.name.clone()),
            refreshed_at: Some(d.refreshed_at.to_rfc3339()),
        },
        None => DirectoryStatus {
            loaded: false,
            users: 0,
            company: None,
            refreshed_at: None,
        },
    };

    Json(JsonResponse::ok(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        directory: status,
    }))
}

#[derive(Deserialize)]
struct UserQuery {
    username: Option<String>,
    email: Option<String>,
}

async fn get_user(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<ProfileRecord>> {
    let Query(query) = query.map_err(|_| ApiError::bad_request("specify one username or email"))?;
    let (kind, identifier) = match (query.username, query.email) {
        (Some(username), None) => (IdentifierKind::Username, username),
        (None, Some(email)) => (IdentifierKind::Email, email),
        _ => return Err(ApiError::bad_request("specify one username or email")),
    };
    if identifier.trim().is_empty() {
        return Err(ApiError::bad_request("specify one username or email"));
    }

    let directory = state
        .directory
        .current()
        .await
        .ok_or_else(|| ApiError::unavailable("directory not loaded yet"))?;

    directory
        .lookup(kind, &identifier)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no directory record for {} {}", kind, identifier)))
}
