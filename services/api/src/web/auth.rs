//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup and login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use neural_impulse_core::domain::NewUser;
use neural_impulse_core::ports::PortError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::web::form::json_body;
use crate::web::state::AppState;
use crate::web::views::{MessageResponse, UserView};

/// An email may be claimed again once its last signup is older than this.
pub const REACTIVATION_AFTER_DAYS: i64 = 30;

static EMAIL_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$"));

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /signup - Create an account, or re-activate a dormant one
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = MessageResponse),
        (status = 200, description = "Dormant account re-activated", body = MessageResponse),
        (status = 400, description = "Missing fields, invalid email, or email already in use"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let req = json_body(payload)?;
    let name = req.name.trim();
    let email = req.email.trim();
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".to_string(),
        ));
    }
    if !is_valid_email(email)? {
        return Err(ApiError::BadRequest("Please enter a valid email".to_string()));
    }

    match state.db.get_user_by_email(email).await {
        Ok(mut existing) => {
            let cutoff = Utc::now() - Duration::days(REACTIVATION_AFTER_DAYS);
            if existing.last_signup_at >= cutoff {
                return Err(email_taken());
            }

            existing.name = name.to_string();
            existing.password_hash = hash_password(&req.password)?;
            existing.last_signup_at = Utc::now();
            state.db.save_user(&existing).await?;

            info!(user_id = %existing.id, "Dormant account re-activated");
            Ok((
                StatusCode::OK,
                Json(MessageResponse::new("User updated successfully")),
            ))
        }
        Err(PortError::NotFound(_)) => {
            let user = state
                .db
                .create_user(NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash: hash_password(&req.password)?,
                })
                .await
                .map_err(|e| match e {
                    PortError::Conflict(_) => email_taken(),
                    other => other.into(),
                })?;

            info!(user_id = %user.id, "User created");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new("User created successfully")),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /login - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let req = json_body(payload)?;
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = match state.db.get_user_by_email(email).await {
        Ok(user) => user,
        Err(PortError::NotFound(_)) => return Err(bad_credentials()),
        Err(e) => return Err(e.into()),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Invalid password hash".to_string())
    })?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| bad_credentials())?;

    let token = state.tokens.issue(&user)?;
    info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        user: UserView::from(&user),
    }))
}

//=========================================================================================
// Helpers
//=========================================================================================

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })
}

fn is_valid_email(email: &str) -> ApiResult<bool> {
    EMAIL_PATTERN
        .as_ref()
        .map(|pattern| pattern.is_match(email))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

fn email_taken() -> ApiError {
    ApiError::BadRequest("User with this email already exists".to_string())
}

fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".to_string())
}
