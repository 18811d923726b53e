//! Bearer-token authentication.
//!
//! A handler that takes an [`AuthUser`] only runs for requests carrying a
//! valid `Authorization: Bearer <jwt>` header. The token is checked for
//! signature and expiry only; handlers that depend on the current account
//! state (role, status) re-read the user row.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use rentora_core::error::CoreError;
use rentora_core::types::DbId;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::AppError;
use crate::state::AppState;

/// The caller identified by a valid token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Role at the time the token was issued.
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            role: claims.role,
        }
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

/// Token part of an `Authorization: Bearer <token>` header. The scheme name
/// is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Not authorized"))?
        .to_str()
        .map_err(|_| unauthorized("Malformed Authorization header"))?;

    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                return Err(unauthorized("Empty bearer token"));
            }
            Ok(token)
        }
        _ => Err(unauthorized("Expected Authorization: Bearer <token>")),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            unauthorized("Invalid or expired token")
        })?;
        Ok(claims.into())
    }
}
