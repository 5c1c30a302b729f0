//! services/api/src/web/blog.rs
//!
//! Handlers for blogs, likes, and comments.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use neural_impulse_core::services::BlogDraft;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::web::form::{json_body, FormData};
use crate::web::identity::AuthenticatedUser;
use crate::web::state::AppState;
use crate::web::views::{BlogView, MessageResponse};

#[derive(Deserialize, ToSchema)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct CommentDeletedResponse {
    pub message: String,
    pub blog: BlogView,
}

fn parse_blog_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid blog ID".to_string()))
}

/// List every blog in publication order.
#[utoipa::path(
    get,
    path = "/blog",
    responses(
        (status = 200, description = "All blogs", body = [BlogView]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Blogs"
)]
pub async fn list_blogs_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BlogView>>> {
    let blogs = state.blogs.list().await?;
    Ok(Json(blogs.iter().map(BlogView::from).collect()))
}

/// Publish a blog.
///
/// Accepts `multipart/form-data` with the text fields `title`, `description`,
/// `excerpt`, `quote`, `category` and an optional `photo` file.
#[utoipa::path(
    post,
    path = "/blog",
    request_body(content_type = "multipart/form-data", description = "Blog fields and an optional photo."),
    responses(
        (status = 201, description = "Blog created", body = BlogView),
        (status = 400, description = "Missing field, unknown category, or rejected image"),
        (status = 401, description = "Missing or malformed token, or unknown user"),
        (status = 403, description = "Invalid or expired token"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "Blogs"
)]
pub async fn create_blog_handler(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(caller): AuthenticatedUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<BlogView>)> {
    let mut form = FormData::collect(multipart).await?;
    let draft = BlogDraft {
        title: form.text_or_empty("title"),
        description: form.text_or_empty("description"),
        excerpt: form.text_or_empty("excerpt"),
        quote: form.text_or_empty("quote"),
        category: form.text_or_empty("category"),
        photo: form.take_file("photo"),
    };

    let blog = state.blogs.create(&caller, draft).await?;
    Ok((StatusCode::CREATED, Json(blog.into())))
}

/// Fetch a single blog.
#[utoipa::path(
    get,
    path = "/blog/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "The blog", body = BlogView),
        (status = 400, description = "Invalid blog ID"),
        (status = 404, description = "Blog not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Blogs"
)]
pub async fn get_blog_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<BlogView>> {
    let blog_id = parse_blog_id(&id)?;
    let blog = state.blogs.get(blog_id).await?;
    Ok(Json(blog.into()))
}

/// Delete a blog. Only its author may do so.
#[utoipa::path(
    delete,
    path = "/blog/{id}",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog deleted", body = MessageResponse),
        (status = 400, description = "Invalid blog ID"),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Invalid token, or caller is not the author"),
        (status = 404, description = "Blog not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "Blogs"
)]
pub async fn delete_blog_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> ApiResult<Json<MessageResponse>> {
    let blog_id = parse_blog_id(&id)?;
    state.blogs.delete(&caller, blog_id).await?;
    Ok(Json(MessageResponse::new("Blog successfully deleted")))
}

/// Like the blog, or take the like back if the caller already liked it.
#[utoipa::path(
    put,
    path = "/blog/{id}/like",
    params(("id" = String, Path, description = "Blog id")),
    responses(
        (status = 200, description = "The blog after the toggle", body = BlogView),
        (status = 400, description = "Invalid blog ID"),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Invalid or expired token"),
        (status = 404, description = "Blog not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "Blogs"
)]
pub async fn toggle_like_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> ApiResult<Json<BlogView>> {
    let blog_id = parse_blog_id(&id)?;
    let blog = state.blogs.toggle_like(&caller, blog_id).await?;
    Ok(Json(blog.into()))
}

/// Comment on a blog.
#[utoipa::path(
    post,
    path = "/blog/{id}/comment",
    params(("id" = String, Path, description = "Blog id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "The blog with the new comment", body = BlogView),
        (status = 400, description = "Invalid blog ID or empty text"),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Invalid or expired token"),
        (status = 404, description = "Blog not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "Blogs"
)]
pub async fn add_comment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AuthenticatedUser(caller): AuthenticatedUser,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BlogView>)> {
    let blog_id = parse_blog_id(&id)?;
    let req = json_body(payload)?;
    let blog = state.blogs.add_comment(&caller, blog_id, &req.text).await?;
    Ok((StatusCode::CREATED, Json(blog.into())))
}

/// Remove a comment. Allowed for the comment's author and the blog's author.
#[utoipa::path(
    delete,
    path = "/blog/{id}/comment/{comment_id}",
    params(
        ("id" = String, Path, description = "Blog id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "The blog after the removal", body = CommentDeletedResponse),
        (status = 400, description = "Invalid blog ID"),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Invalid token, or caller may not delete this comment"),
        (status = 404, description = "Blog not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer" = [])),
    tag = "Blogs"
)]
pub async fn delete_comment_handler(
    State(state): State<Arc<AppState>>,
    Path((id, comment_id)): Path<(String, String)>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> ApiResult<Json<CommentDeletedResponse>> {
    let blog_id = parse_blog_id(&id)?;
    let blog = state
        .blogs
        .delete_comment(&caller, blog_id, &comment_id)
        .await?;
    Ok(Json(CommentDeletedResponse {
        message: "Comment deleted".to_string(),
        blog: blog.into(),
    }))
}
