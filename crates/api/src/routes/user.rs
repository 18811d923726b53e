//! Route definitions for the `/user` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`.
///
/// ```text
/// POST /registration  -> registration
/// POST /login         -> login
/// POST /adminLogin    -> admin_login (staff only)
/// GET  /auth          -> check (requires auth)
/// GET  /adminAuth     -> admin_check (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/registration", post(user::registration))
        .route("/login", post(user::login))
        .route("/adminLogin", post(user::admin_login))
        .route("/auth", get(user::check))
        .route("/adminAuth", get(user::admin_check))
}
