//! Role-based access control (RBAC) extractors.
//!
//! Every write on the platform is open to staff (admins and moderators)
//! alike, so one extractor covers them all.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rentora_core::error::CoreError;
use rentora_core::roles::is_staff;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires `admin` or `moderator`. Rejects with 403 Forbidden otherwise.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_staff(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or Moderator role required".into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}
