//! Bearer-token guard for mutating routes.
//!
//! Handlers opt in by taking an [`Authorized`] argument. The extractor runs
//! before the request body is read, so an unauthenticated write never
//! reaches the store.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::ApiError;
use crate::state::AppState;

/// Holds the configured token. Never logged or echoed.
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }

    /// Compare without short-circuiting on the first differing byte.
    pub fn verify(&self, presented: &str) -> bool {
        let expected = self.token.as_bytes();
        let presented = presented.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected
            .iter()
            .zip(presented)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"<redacted>").finish()
    }
}

/// Extract the credential from `Authorization: Bearer <token>`.
/// The scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Proof that the request carried the configured bearer token.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

#[async_trait]
impl FromRequestParts<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        match bearer_token(&parts.headers) {
            Some(token) if state.auth.verify(token) => Ok(Authorized),
            Some(_) => {
                tracing::warn!(path = %parts.uri.path(), "Rejected invalid bearer token");
                Err(ApiError::Unauthorized)
            }
            None => {
                tracing::debug!(path = %parts.uri.path(), "Missing bearer credentials");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
