//! services/api/src/web/profile.rs
//!
//! Handlers for a user's own profile and avatar.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use neural_impulse_core::services::ProfileUpdate;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::web::form::FormData;
use crate::web::identity::AuthenticatedUser;
use crate::web::state::AppState;
use crate::web::views::{MessageResponse, UserView};

#[derive(Serialize, ToSchema)]
pub struct ProfileUpdatedResponse {
    pub message: String,
    pub user: UserView,
}

fn parse_user_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))
}

/// Fetch a public profile.
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The profile", body = UserView),
        (status = 400, description = "Invalid user ID"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Profiles"
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserView>> {
    let user_id = parse_user_id(&id)?;
    let user = state.profiles.get(user_id).await?;
    Ok(Json(UserView::from(&user)))
}

/// Edit the caller's own profile.
///
/// Accepts `multipart/form-data` with `name` (required), `designation`, `age`,
/// `location`, `about`, `deleteAvatar` (`"true"` to remove the avatar) and an
/// optional `avatar` file that replaces the current one.
#[utoipa::path(
    put,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body(content_type = "multipart/form-data", description = "Profile fields and an optional avatar."),
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdatedResponse),
        (status = 400, description = "Invalid user ID, missing name, or rejected image"),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Invalid token, or token does not match user ID"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Media store or database failure")
    ),
    security(("bearer" = [])),
    tag = "Profiles"
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AuthenticatedUser(caller): AuthenticatedUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ProfileUpdatedResponse>> {
    let user_id = parse_user_id(&id)?;
    let mut form = FormData::collect(multipart).await?;
    let update = ProfileUpdate {
        name: form.text_or_empty("name"),
        designation: form.text("designation").map(str::to_string),
        age: form.text("age").map(str::to_string),
        location: form.text("location").map(str::to_string),
        about: form.text("about").map(str::to_string),
        delete_avatar: form.flag("deleteAvatar"),
        avatar: form.take_file("avatar"),
    };

    let user = state.profiles.update(&caller, user_id, update).await?;
    Ok(Json(ProfileUpdatedResponse {
        message: "Profile updated successfully".to_string(),
        user: UserView::from(&user),
    }))
}

/// Delete the caller's own account.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 400, description = "Invalid user ID"),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Invalid token, or token does not match user ID"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Media store or database failure")
    ),
    security(("bearer" = [])),
    tag = "Profiles"
)]
pub async fn delete_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> ApiResult<Json<MessageResponse>> {
    let user_id = parse_user_id(&id)?;
    state.profiles.delete_account(&caller, user_id).await?;
    Ok(Json(MessageResponse::new("Profile deleted successfully")))
}

/// Remove the caller's avatar.
#[utoipa::path(
    delete,
    path = "/user/{id}/avatar",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Avatar deleted", body = MessageResponse),
        (status = 400, description = "Invalid user ID, or no avatar to delete"),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Invalid token, or token does not match user ID"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Media store or database failure")
    ),
    security(("bearer" = [])),
    tag = "Profiles"
)]
pub async fn delete_avatar_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> ApiResult<Json<MessageResponse>> {
    let user_id = parse_user_id(&id)?;
    state.profiles.delete_avatar(&caller, user_id).await?;
    Ok(Json(MessageResponse::new("Avatar deleted successfully")))
}

/// Any other method on `/user/{id}`.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
