pub mod auth;
pub mod blog;
pub mod form;
pub mod identity;
pub mod profile;
pub mod rest;
pub mod state;
pub mod views;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ConfigError;
use crate::error::ApiResult;
use rest::ApiDoc;
use state::AppState;

/// Request bodies larger than this are refused before any handler runs.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds the complete application: every API route, CORS for the public site,
/// request tracing, and the Swagger UI.
pub fn router(state: Arc<AppState>) -> ApiResult<Router> {
    let origin = state
        .config
        .public_base_url
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("PUBLIC_BASE_URL".to_string(), e.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup_handler))
        .route("/login", post(auth::login_handler));

    let blog_routes = Router::new()
        .route(
            "/blog",
            get(blog::list_blogs_handler).post(blog::create_blog_handler),
        )
        .route(
            "/blog/{id}",
            get(blog::get_blog_handler).delete(blog::delete_blog_handler),
        )
        .route("/blog/{id}/like", put(blog::toggle_like_handler))
        .route("/blog/{id}/comment", post(blog::add_comment_handler))
        .route(
            "/blog/{id}/comment/{comment_id}",
            delete(blog::delete_comment_handler),
        );

    let profile_routes = Router::new()
        .route(
            "/user/{id}",
            get(profile::get_profile_handler)
                .put(profile::update_profile_handler)
                .delete(profile::delete_profile_handler)
                .fallback(profile::method_not_allowed),
        )
        .route("/user/{id}/avatar", delete(profile::delete_avatar_handler));

    let api_router = Router::new()
        .route("/health", get(rest::health_handler))
        .merge(auth_routes)
        .merge(blog_routes)
        .merge(profile_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
