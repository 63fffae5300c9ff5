use std::collections::HashMap;

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct UserDoc {
    /// RFC3339 timestamp set at creation.
    pub created_at: String,
    pub display_name: String,
    pub email: String,
}

#[derive(ToSchema)]
pub struct UserListDoc(pub HashMap<String, UserDoc>);

#[derive(ToSchema)]
pub struct CreateUserRequestDoc { pub display_name: Option<String>, pub email: Option<String> }

#[derive(ToSchema)]
pub struct UpdateUserRequestDoc { pub display_name: Option<String> }

#[derive(ToSchema)]
pub struct CreatedUserDoc { pub user_id: String }

#[derive(ToSchema)]
pub struct ErrorResponseDoc {
    pub status: String,
    pub code: Option<i64>,
    pub error: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::now,
        crate::routes::users::list,
        crate::routes::users::create,
        crate::routes::users::get,
        crate::routes::users::update,
        crate::routes::users::delete,
    ),
    components(
        schemas(
            UserDoc,
            UserListDoc,
            CreateUserRequestDoc,
            UpdateUserRequestDoc,
            CreatedUserDoc,
            ErrorResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users")
    )
)]
pub struct ApiDoc;
