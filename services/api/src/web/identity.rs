//! services/api/src/web/identity.rs
//!
//! Bearer-token authentication for handlers that mutate state.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use neural_impulse_core::domain::Caller;
use neural_impulse_core::ports::CredentialError;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// The verified caller of a request, taken from `Authorization: Bearer <token>`.
///
/// Rejects with 401 when the header is missing or malformed, and with 403 when
/// the token itself does not verify.
pub struct AuthenticatedUser(pub Caller);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let caller = state.tokens.verify(token).map_err(|e| {
            debug!(error = ?e, "Rejected bearer token");
            e
        })?;
        Ok(AuthenticatedUser(caller))
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialError::Missing)?
        .to_str()
        .map_err(|_| CredentialError::Malformed)?;

    let Some((scheme, token)) = header.split_once(' ') else {
        return Err(CredentialError::Malformed);
    };
    let token = token.trim();
    // The auth scheme is case-insensitive.
    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return Err(CredentialError::Malformed);
    }
    Ok(token)
}
