pub mod users;

use std::{sync::Arc, time::Duration};

use axum::{routing::get, Json, Router};
use chrono::Local;
use configs::MissingUserPolicy;
use service::UserService;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;

#[derive(Clone)]
pub struct ServerState {
    pub users: Arc<UserService>,
    pub missing_user: MissingUserPolicy,
}

/// Current server time as plain text.
#[utoipa::path(get, path = "/", tag = "health", responses((status = 200, description = "Server local time", body = String, content_type = "text/plain")))]
pub async fn now() -> String {
    Local::now().to_string()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router with its middleware stack.
pub fn build_router(state: ServerState, request_timeout: Duration) -> Router {
    // chi-style routes answer both with and without the trailing slash
    let users = Router::new()
        .route("/api/v1/users", get(users::list).post(users::create))
        .route("/api/v1/users/", get(users::list).post(users::create))
        .route("/api/v1/users/:id", get(users::get).patch(users::update).delete(users::delete))
        .route("/api/v1/users/:id/", get(users::get).patch(users::update).delete(users::delete));

    Router::new()
        .route("/", get(now))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(users)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        // 500 instead of a dropped connection
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                ),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
