//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how each
//! kind of failure is rendered to HTTP clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use neural_impulse_core::ports::{CredentialError, MediaError, PortError};
use neural_impulse_core::services::ServiceError;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A failure reported by the blog or profile services.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The bearer credential was missing or refused.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error while running the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or missing request input.
    #[error("{0}")]
    BadRequest(String),

    /// Wrong email or password at login.
    #[error("{0}")]
    Unauthorized(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Credential(e) => match e {
                CredentialError::Missing | CredentialError::Malformed => StatusCode::UNAUTHORIZED,
                CredentialError::Invalid(_) | CredentialError::InvalidSubject => {
                    StatusCode::FORBIDDEN
                }
                CredentialError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Service(e) => match e {
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Media {
                    source: MediaError::Rejected(_),
                    ..
                } => StatusCode::BAD_REQUEST,
                ServiceError::Media { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                ServiceError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
                ServiceError::Port(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            match &self {
                // Media failures already carry a readable message.
                ApiError::Service(ServiceError::Media { .. }) => {
                    json!({ "error": self.to_string() })
                }
                _ => json!({
                    "error": "Internal server error",
                    "details": self.to_string(),
                }),
            }
        } else {
            json!({ "error": self.to_string() })
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn expected_faults_keep_their_message() {
        let (status, body) =
            render(ServiceError::Forbidden("Forbidden: nope".into()).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden: nope");

        let (status, body) = render(CredentialError::Missing.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized: Missing token");

        let (status, _) = render(CredentialError::InvalidSubject.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unexpected_faults_become_500_with_details() {
        let (status, body) =
            render(PortError::Unexpected("connection reset".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(body["details"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn rejected_uploads_are_client_errors() {
        let err = ServiceError::Media {
            context: "Failed to upload avatar".into(),
            source: MediaError::Rejected("File must be an image".into()),
        };
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Failed to upload avatar: File must be an image");
    }
}
