//! services/api/src/adapters/jwt.rs
//!
//! Signed bearer tokens (HS256 JSON Web Tokens). Implements the `TokenService`
//! port; the embedded `_id` claim is the caller's user id.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use neural_impulse_core::domain::{Caller, User};
use neural_impulse_core::ports::{CredentialError, TokenService};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME_HOURS: i64 = 12;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }
}

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    /// Signs arbitrary claims with this service's secret.
    pub fn sign(&self, claims: &Claims) -> Result<String, CredentialError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<String, CredentialError> {
        self.sign(&Claims::for_user(user, self.lifetime))
    }

    fn verify(&self, token: &str) -> Result<Caller, CredentialError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| CredentialError::Invalid(e.to_string()))?;
        let user_id =
            Uuid::parse_str(&data.claims.id).map_err(|_| CredentialError::InvalidSubject)?;
        Ok(Caller { user_id })
    }
}
