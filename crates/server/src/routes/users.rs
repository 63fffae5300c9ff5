use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use configs::MissingUserPolicy;
use models::{
    user::{CreateUserRequest, CreatedUser, UpdateUserRequest},
    User, UserList,
};
use tracing::{debug, info};

use crate::{errors::ApiError, routes::ServerState};

#[utoipa::path(
    get, path = "/api/v1/users/", tag = "users",
    responses(
        (status = 200, description = "Map of id to user", body = crate::openapi::UserListDoc),
        (status = 500, description = "Store unreadable (strict load only)", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<UserList>, ApiError> {
    let users = state.users.list_users().await?;
    info!(count = users.len(), "list users");
    Ok(Json(users))
}

#[utoipa::path(
    post, path = "/api/v1/users/", tag = "users",
    request_body = crate::openapi::CreateUserRequestDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CreatedUserDoc),
        (status = 400, description = "Invalid body", body = crate::openapi::ErrorResponseDoc),
        (status = 500, description = "Save failed", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    let Json(input) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    let user_id = state.users.create_user(input).await?;
    info!(id = %user_id, "created user");
    Ok((StatusCode::CREATED, Json(CreatedUser { user_id })))
}

/// Unknown ids answer with a zero-valued user unless `storage.missing_user = "not_found"`.
#[utoipa::path(
    get, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User (zero-valued when unknown)", body = crate::openapi::UserDoc),
        (status = 404, description = "Unknown id (not_found policy)", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<User>, ApiError> {
    match state.users.get_user(&id).await? {
        Some(user) => Ok(Json(user)),
        None => match state.missing_user {
            MissingUserPolicy::Empty => {
                debug!(id = %id, "unknown user; answering zero value");
                Ok(Json(User::zero()))
            }
            MissingUserPolicy::NotFound => Err(ApiError::user_not_found()),
        },
    }
}

/// An unknown id wins over a malformed body.
#[utoipa::path(
    patch, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = crate::openapi::UpdateUserRequestDoc,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid body", body = crate::openapi::ErrorResponseDoc),
        (status = 404, description = "Unknown id", body = crate::openapi::ErrorResponseDoc),
        (status = 500, description = "Save failed", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            if !state.users.user_exists(&id).await? {
                return Err(ApiError::user_not_found());
            }
            return Err(ApiError::InvalidBody(rejection.body_text()));
        }
    };
    state.users.update_display_name(&id, input.display_name).await?;
    info!(id = %id, "updated user");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/api/v1/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown id", body = crate::openapi::ErrorResponseDoc),
        (status = 500, description = "Save failed", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.users.delete_user(&id).await?;
    info!(id = %id, "deleted user");
    Ok(StatusCode::NO_CONTENT)
}
