use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};

use crate::config::{AppConfig, Env, IdentityConfig};

/// Cookie in which the identity provider stores the session token for browser requests.
pub const SESSION_COOKIE: &str = "__session";

/// Development-only header accepted in `Env::Local` instead of a signed token.
pub const LOCAL_BYPASS_HEADER: &str = "x-user-email";

/// Claims
///
/// Payload of a session token issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Provider-side user identifier.
    pub sub: String,
    /// Primary email of the signed-in user, absent for some sign-in methods.
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Session
///
/// A validated session: who is signed in and under which email. This is all the
/// application consumes from the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
        }
    }
}

// 1. IdentityProvider Contract
/// IdentityProvider
///
/// Answers "is this token a valid session, and for whom". Sign-in and token issuance
/// happen entirely on the provider's side.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_session(&self, token: &str) -> Option<Session>;
}

/// IdentityState
///
/// The concrete type used to share the identity provider across the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;

// 2. Signed-token verification
/// JwtIdentityProvider
///
/// Verifies provider-issued JWTs locally: RS256 against the provider's public key
/// when configured, HS256 against a shared secret otherwise. Expiry is always checked.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_rsa_pem(pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        Ok(Self {
            decoding_key: DecodingKey::from_rsa_pem(pem.as_bytes())?,
            validation,
        })
    }

    pub fn from_config(config: &IdentityConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        match &config.jwt_public_key_pem {
            Some(pem) => Self::from_rsa_pem(pem),
            None => Ok(Self::from_secret(&config.jwt_secret)),
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_session(&self, token: &str) -> Option<Session> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.into()),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    _ => tracing::debug!(error = %e, "session token rejected"),
                }
                None
            }
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// MockIdentityProvider
///
/// Maps opaque token strings to sessions.
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    sessions: HashMap<String, Session>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, token: &str, user_id: &str, email: Option<&str>) -> Self {
        self.sessions.insert(
            token.to_string(),
            Session {
                user_id: user_id.to_string(),
                email: email.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify_session(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).cloned()
    }
}

// --- Token extraction ---

/// Finds the session token: the `Authorization: Bearer` header first, then the
/// `__session` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer.or_else(|| cookie_value(headers, SESSION_COOKIE))
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// resolve_session
///
/// Resolves the caller's session from request headers, delegating the credential
/// check to the identity provider.
///
/// With `APP_ENV=local` set explicitly, an `x-user-email` header stands in for a
/// session so the back-office can be exercised without the provider. It is ignored
/// in production and when APP_ENV is unset or unknown.
pub async fn resolve_session(
    identity: &dyn IdentityProvider,
    config: &AppConfig,
    headers: &HeaderMap,
) -> Option<Session> {
    if config.env == Env::Local && config.local_session_bypass {
        if let Some(email) = headers
            .get(LOCAL_BYPASS_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|email| !email.is_empty())
        {
            return Some(Session {
                user_id: format!("local:{}", email),
                email: Some(email.to_string()),
            });
        }
    }

    let token = session_token(headers)?;
    identity.verify_session(token).await
}

/// Session Extractor Implementation
///
/// The access gate resolves the session once and stores it in the request
/// extensions; handlers take `Session` as an argument to read it back.
///
/// Rejection: `401 Unauthorized` when the gate did not attach a session.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
