//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the liveness probe.

use axum::Json;
use serde::Serialize;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::web::{auth, blog, profile, views};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::signup_handler,
        auth::login_handler,
        blog::list_blogs_handler,
        blog::create_blog_handler,
        blog::get_blog_handler,
        blog::delete_blog_handler,
        blog::toggle_like_handler,
        blog::add_comment_handler,
        blog::delete_comment_handler,
        profile::get_profile_handler,
        profile::update_profile_handler,
        profile::delete_profile_handler,
        profile::delete_avatar_handler,
    ),
    components(
        schemas(
            HealthResponse,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            blog::CommentRequest,
            blog::CommentDeletedResponse,
            profile::ProfileUpdatedResponse,
            views::MessageResponse,
            views::UserView,
            views::BlogView,
            views::AuthorView,
            views::CommentView,
            views::CommenterView,
            views::AvatarView,
            views::ImageView,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup and login."),
        (name = "Blogs", description = "Blogs, likes and comments."),
        (name = "Profiles", description = "User profiles and avatars.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
